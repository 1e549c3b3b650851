/// Errors that can occur during external service communication
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Service unreachable or timeout
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Invalid response format from external service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Non-2xx answer, with the `detail` the service reported
    #[error("Rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    /// 2xx answer carrying `success: false`
    #[error("Unsuccessful response: {0}")]
    Unsuccessful(String),
}

impl ConnectorError {
    /// Message reported by the remote service, when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => Some(detail),
            Self::Unsuccessful(message) => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else {
            Self::HttpError(err.to_string())
        }
    }
}
