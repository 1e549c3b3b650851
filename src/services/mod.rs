pub mod auth;
pub mod chat;
pub mod document;

pub use auth::{AuthError, LoginOutcome};
pub use chat::{AskOutcome, AskRequest, AskScope, ChatError, ChatService, SessionContext};
pub use document::{DocumentError, DocumentService, NewUpload, StatusReport, UploadOutcome};
