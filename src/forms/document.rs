use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

use crate::models::DocumentStatus;

/// Text fields of the multipart upload form.
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct UploadMeta {
    #[validate(min_length = 3)]
    #[validate(max_length = 200)]
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct WebhookStatus {
    #[serde(alias = "documentId")]
    pub document_id: Uuid,
    pub status: DocumentStatus,
    #[serde(default, alias = "aiPipelineId")]
    pub ai_pipeline_id: Option<String>,
    #[serde(default, alias = "errorMessage")]
    #[validate(max_length = 1000)]
    pub error_message: Option<String>,
}
