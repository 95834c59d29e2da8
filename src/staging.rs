use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::StageError;

pub const PDF_MIME: &str = "application/pdf";

/// A local PDF picked for upload but not yet sent.
#[derive(Clone)]
pub struct StagedFile {
    pub name: String,
    pub mime_type: String,
    content: Arc<[u8]>,
}

impl StagedFile {
    /// Reads `path` if it names a PDF. Non-PDF files are rejected before any I/O.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let path = path.as_ref();
        mime_type(path).ok_or_else(|| StageError::NotPdf {
            path: path.to_path_buf(),
        })?;
        let content = tokio::fs::read(path).await.map_err(|e| StageError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Ok(StagedFile {
            name,
            mime_type: PDF_MIME.to_string(),
            content: content.into(),
        })
    }

    pub fn from_bytes(name: impl Into<String>, content: Vec<u8>) -> Result<Self, StageError> {
        let name = name.into();
        let mime = mime_type(Path::new(&name)).ok_or_else(|| StageError::NotPdf {
            path: name.clone().into(),
        })?;
        Ok(StagedFile {
            name,
            mime_type: mime.to_string(),
            content: content.into(),
        })
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn byte_size(&self) -> u64 {
        self.content.len() as u64
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.content.len())
            .finish()
    }
}

fn mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?;
    match extension.to_lowercase().as_str() {
        "pdf" => Some(PDF_MIME),
        _ => None,
    }
}

/// Files selected on the landing screen, in selection order.
#[derive(Debug, Clone, Default)]
pub struct Staging {
    files: Vec<StagedFile>,
}

impl Staging {
    pub fn push(&mut self, file: StagedFile) {
        self.files.push(file);
    }

    pub fn remove(&mut self, index: usize) -> Option<StagedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    /// Empties the list, handing every file to the caller for upload.
    pub fn take_all(&mut self) -> Vec<StagedFile> {
        std::mem::take(&mut self.files)
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
