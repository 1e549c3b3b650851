//! Admin token helpers
//!
//! HS256 tokens issued at login and checked by the authentication middleware.

pub mod jwt;

pub use jwt::{
    extract_bearer_token, issue_token, verify_token, JwtClaims, JwtError, ADMIN_ROLE,
};
