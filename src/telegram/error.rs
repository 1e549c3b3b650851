//! Error types for the Telegram bot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    /// The backend could not be reached or did not answer in time.
    #[error("Backend server is not responding. Please try again later.")]
    BackendUnavailable,

    /// The backend answered with an error envelope or a non-2xx status.
    #[error("API Error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),
}

pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            TelegramError::BackendUnavailable
        } else {
            TelegramError::Request(e.to_string())
        }
    }
}
