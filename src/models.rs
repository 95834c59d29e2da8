use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A PDF the backend has accepted. Only `id` comes from the service; the rest
/// describes the bytes that were actually sent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub display_name: String,
    pub byte_size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// First assistant message of this document's conversation.
    pub fn welcome_text(&self) -> String {
        format!(
            "Hello! I'm DocuMate, your AI assistant. I'm ready to help you analyze and understand {}. Ask me anything about it!",
            self.display_name
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub author: Author,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(author: Author, text: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            text: text.into(),
            author,
            sent_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Author::Assistant, text)
    }
}

// Wire shapes of the document service.

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadResponse {
    pub pdf_id: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QueryRequest {
    pub pdf_id: String,
    pub query: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QueryResponse {
    pub pdf_id: String,
    pub query: String,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_wire_format() {
        let request = QueryRequest {
            pdf_id: "abc123".to_string(),
            query: "What is the summary?".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "pdf_id": "abc123", "query": "What is the summary?" })
        );
    }

    #[test]
    fn test_upload_response_ignores_extra_fields() {
        let body = r#"{"pdf_id":"abc123","message":"PDF uploaded","pages":4}"#;
        let response: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.pdf_id, "abc123");
        assert_eq!(response.message, "PDF uploaded");
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let first = Message::user("hello");
        let second = Message::user("hello");
        assert_ne!(first.id, second.id);
        assert_eq!(first.author, Author::User);
        assert_eq!(Message::assistant("hi").author, Author::Assistant);
    }
}
