mod admin_user;
mod conversation;
mod document;

pub use admin_user::*;
pub use conversation::*;
pub use document::*;
