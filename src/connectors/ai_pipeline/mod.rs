//! AI pipeline connector module
//!
//! The pipeline indexes uploaded documents and answers questions over them.
//! Everything the backend asks of it goes through [`AiPipelineConnector`].

use actix_web::web;
use async_trait::async_trait;
use std::sync::Arc;

use crate::connectors::config::AiPipelineConfig;
use crate::connectors::errors::ConnectorError;

pub mod client;
pub mod mock;
pub mod types;

pub use client::AiPipelineClient;
pub use mock::MockAiPipelineConnector;
pub use types::{ChatAnswer, DocumentUpload, ProcessOutcome};

#[async_trait]
pub trait AiPipelineConnector: Send + Sync {
    /// General question, or a question scoped to one pipeline document.
    async fn query(
        &self,
        query: &str,
        document_id: Option<&str>,
    ) -> Result<ChatAnswer, ConnectorError>;

    /// Question searched across several pipeline documents.
    async fn search_multiple(
        &self,
        query: &str,
        document_ids: &[String],
    ) -> Result<ChatAnswer, ConnectorError>;

    async fn process_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<ProcessOutcome, ConnectorError>;

    /// Human readable processing status reported by the pipeline.
    async fn document_status(&self, pipeline_id: &str) -> Result<String, ConnectorError>;

    async fn delete_document(&self, pipeline_id: &str) -> Result<(), ConnectorError>;

    async fn health(&self) -> Result<(), ConnectorError>;
}

/// Initialize the AI pipeline connector from settings.
///
/// Mock mode answers locally and never opens a connection.
pub fn init(
    config: &AiPipelineConfig,
) -> Result<web::Data<Arc<dyn AiPipelineConnector>>, ConnectorError> {
    let connector: Arc<dyn AiPipelineConnector> = if config.mock {
        tracing::warn!("AI pipeline running in mock mode");
        Arc::new(MockAiPipelineConnector::default())
    } else {
        tracing::info!("Initializing AI pipeline connector: {}", config.base_url);
        Arc::new(AiPipelineClient::new(config.clone())?)
    };

    Ok(web::Data::new(connector))
}
