pub mod authentication;
pub mod authorization;

pub use authentication::AdminAuthentication;
pub use authorization::AdminOnly;
