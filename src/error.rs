use std::path::PathBuf;
use thiserror::Error;

/// Failure of a call to the document service.
///
/// Both kinds are recoverable: the caller shows them and the user may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No usable response: connection failure, or a body that could not be decoded.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("server error {status}: {status_text}")]
    Server { status: u16, status_text: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// A local file could not be staged for upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("{} is not a PDF file", path.display())]
    NotPdf { path: PathBuf },

    #[error("failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}
