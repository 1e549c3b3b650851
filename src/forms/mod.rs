pub mod auth;
pub mod chat;
pub mod document;

pub use auth::Login;
pub use chat::{AskQuestion, ConversationListQuery, TelegramAsk};
pub use document::{UploadMeta, WebhookStatus};
