use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct MultiSearchRequest<'a> {
    pub query: &'a str,
    pub document_ids: &'a [String],
}

/// Answer of `/api/chat/query` and `/api/chat/search-multiple`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub success: bool,
    pub response: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub sources: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub top_source_suggestions: Option<Vec<String>>,
}

pub(crate) fn default_content_type() -> String {
    "markdown".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessResponse {
    pub success: bool,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Error body of the pipeline (`{"detail": ...}`); detail is usually a string.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// File handed to the pipeline for indexing.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub document_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The pipeline indexed the file synchronously.
    Indexed { pipeline_id: String },
    /// Indexing completes later; the caller marks the document indexed after `after`.
    Deferred { pipeline_id: String, after: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_answer_defaults() {
        let answer: ChatAnswer =
            serde_json::from_str(r#"{"success": true, "response": "hi", "sources": null}"#)
                .unwrap();
        assert_eq!(answer.content_type, "markdown");
        assert!(answer.sources.is_none());
        assert!(answer.top_source_suggestions.is_none());
    }

    #[test]
    fn query_request_omits_missing_document() {
        let body = serde_json::to_value(QueryRequest {
            query: "fees?",
            document_id: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"query": "fees?"}));
    }

    #[test]
    fn error_detail_text() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Incorrect API key"}"#).unwrap();
        assert_eq!(body.detail_text(), "Incorrect API key");

        let body: ErrorBody = serde_json::from_str(r#"{"detail": [{"loc": "query"}]}"#).unwrap();
        assert!(body.detail_text().contains("loc"));
    }
}
