//! External Service Connectors
//!
//! Adapters for the services the backend talks to. All outbound HTTP goes
//! through a connector so routes and services stay independent and testable.
//!
//! ## Architecture Pattern
//!
//! 1. Define a trait in `{service}/mod.rs` → allows mocking in tests
//! 2. Implement the HTTP client in `{service}/client.rs`
//! 3. Configuration in `config.rs` → switch to the mock per environment
//! 4. Inject the trait object into routes → routes never depend on HTTP details
//!
//! ## Usage in Routes
//!
//! ```ignore
//! pub async fn status(
//!     pipeline: web::Data<Arc<dyn AiPipelineConnector>>,
//! ) -> Result<impl Responder> {
//!     let message = pipeline.document_status("abc").await?;
//! }
//! ```

pub mod admin_service;
pub mod ai_pipeline;
pub mod config;
pub mod errors;

pub use admin_service::{extract_bearer_token, issue_token, verify_token, JwtClaims, JwtError};
pub use ai_pipeline::{
    AiPipelineClient, AiPipelineConnector, ChatAnswer, DocumentUpload, MockAiPipelineConnector,
    ProcessOutcome,
};
pub use config::AiPipelineConfig;
pub use errors::ConnectorError;

pub use ai_pipeline::init as init_ai_pipeline;
