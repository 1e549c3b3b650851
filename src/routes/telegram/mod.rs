mod ask;
mod health;

pub use ask::*;
pub use health::*;
