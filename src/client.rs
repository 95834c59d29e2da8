use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Document, QueryRequest, QueryResponse, UploadResponse};
use crate::staging::StagedFile;

/// The two remote operations the chat needs. No retries and no timeouts here:
/// one failure is handed straight back to the caller.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn submit_document(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> Result<UploadResponse, ApiError>;

    async fn submit_question(
        &self,
        document_id: &str,
        question: &str,
    ) -> Result<QueryResponse, ApiError>;
}

/// `DocumentService` over HTTP: `POST /upload` (multipart) and `POST /query` (JSON).
#[derive(Debug, Clone)]
pub struct HttpDocumentService {
    http: Client,
    upload_url: Url,
    query_url: Url,
}

impl HttpDocumentService {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("documate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpDocumentService {
            http,
            upload_url: config.endpoint("upload")?,
            query_url: config.endpoint("query")?,
        })
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn submit_document(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> Result<UploadResponse, ApiError> {
        debug!("Uploading {} ({} bytes) to {}", file_name, content.len(), self.upload_url);
        let part = reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(file_name.to_string())
            .mime_str(crate::staging::PDF_MIME)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = decode(response, "Upload").await?;
        info!("Uploaded {} as {}", file_name, upload.pdf_id);
        Ok(upload)
    }

    async fn submit_question(
        &self,
        document_id: &str,
        question: &str,
    ) -> Result<QueryResponse, ApiError> {
        debug!("Querying {} at {}", document_id, self.query_url);
        let body = QueryRequest {
            pdf_id: document_id.to_string(),
            query: question.to_string(),
        };
        let response = self
            .http
            .post(self.query_url.clone())
            .json(&body)
            .send()
            .await?;
        decode(response, "Query").await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        // The standard phrase for the code, not whatever phrase the server sent.
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        warn!("{} failed with status {}", operation, status);
        return Err(ApiError::Server {
            status: status.as_u16(),
            status_text: format!("{} failed: {}", operation, reason),
        });
    }
    Ok(response.json::<T>().await?)
}

/// Uploads a staged file and builds the `Document` for it. The id is the one
/// the service issued; size and type describe the bytes that were sent.
pub async fn upload(service: &dyn DocumentService, file: &StagedFile) -> Result<Document, ApiError> {
    let response = service.submit_document(&file.name, file.content()).await?;
    Ok(Document {
        id: response.pdf_id,
        display_name: file.name.clone(),
        byte_size: file.byte_size(),
        mime_type: file.mime_type.clone(),
        uploaded_at: Utc::now(),
    })
}
