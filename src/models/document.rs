use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Pipeline ids carrying this prefix were produced by mock mode and are never sent upstream.
pub const MOCK_PIPELINE_PREFIX: &str = "mock_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum DocumentStatus {
    Processing,
    Indexed,
    Failed,
    PendingApiKey,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Indexed => "indexed",
            DocumentStatus::Failed => "failed",
            DocumentStatus::PendingApiKey => "pending_api_key",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(DocumentStatus::Processing),
            "indexed" => Ok(DocumentStatus::Indexed),
            "failed" => Ok(DocumentStatus::Failed),
            "pending_api_key" => Ok(DocumentStatus::PendingApiKey),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub mime_type: String,
    pub size: i64,
    pub status: DocumentStatus,
    pub ai_pipeline_id: Option<String>,
    pub error_message: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub upload_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn has_mock_pipeline_id(&self) -> bool {
        self.ai_pipeline_id
            .as_deref()
            .map_or(false, |id| id.starts_with(MOCK_PIPELINE_PREFIX))
    }

    /// Pipeline id usable for real queries: present and not produced by mock mode.
    pub fn real_pipeline_id(&self) -> Option<&str> {
        self.ai_pipeline_id
            .as_deref()
            .filter(|id| !id.is_empty() && !id.starts_with(MOCK_PIPELINE_PREFIX))
    }

    pub fn is_queryable(&self) -> bool {
        self.status == DocumentStatus::Indexed && self.real_pipeline_id().is_some()
    }
}

/// Row of the public document listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
    pub uploaded_by: String,
}
