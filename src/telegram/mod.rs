//! Telegram front-end: a thin adapter that relays questions to the backend's
//! `/api/telegram` endpoints and renders answers as Telegram Markdown.

pub mod api_client;
pub mod bot;
pub mod error;
pub mod format;
pub mod handlers;
pub mod rate_limiter;
pub mod state;
pub mod suggestions;

pub use bot::{BotSettings, TelegramBot};
pub use error::TelegramError;
