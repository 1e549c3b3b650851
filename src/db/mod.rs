pub mod admin_user;
pub mod conversation;
pub mod document;
mod store;

pub use store::{ConversationStore, DocumentStore, PgStore};
