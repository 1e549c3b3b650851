mod getheader;
mod manager;
mod method;

pub use getheader::*;
pub use manager::*;

pub const NO_TOKEN_MESSAGE: &str = "Access denied. No token provided.";

/// Why a presented token was not accepted. Read by [`crate::middleware::AdminOnly`].
#[derive(Debug, Clone)]
pub struct AuthFailure(pub String);
