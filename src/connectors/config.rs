use serde::{Deserialize, Serialize};

/// AI pipeline connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiPipelineConfig {
    /// Base URL of the pipeline service (env: AI_PIPELINE_URL)
    pub base_url: String,
    /// Answer locally instead of calling the pipeline (env: MOCK_AI_PIPELINE)
    #[serde(default)]
    pub mock: bool,
    /// Timeout for chat queries and multi-document searches
    #[serde(default = "AiPipelineConfig::default_query_timeout")]
    pub query_timeout_secs: u64,
    /// Timeout for document processing uploads
    #[serde(default = "AiPipelineConfig::default_process_timeout")]
    pub process_timeout_secs: u64,
    /// Timeout for status, delete and health calls
    #[serde(default = "AiPipelineConfig::default_status_timeout")]
    pub status_timeout_secs: u64,
}

impl AiPipelineConfig {
    const fn default_query_timeout() -> u64 {
        30
    }

    const fn default_process_timeout() -> u64 {
        60
    }

    const fn default_status_timeout() -> u64 {
        10
    }
}

impl Default for AiPipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            mock: false,
            query_timeout_secs: Self::default_query_timeout(),
            process_timeout_secs: Self::default_process_timeout(),
            status_timeout_secs: Self::default_status_timeout(),
        }
    }
}
