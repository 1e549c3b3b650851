pub mod auth;
pub mod chat;
pub mod document;
pub mod health_checks;
pub mod telegram;

pub use health_checks::*;
