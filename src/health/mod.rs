mod checks;
mod metrics;
mod models;

pub use checks::HealthChecker;
pub use metrics::{ComponentStats, HealthMetrics};
pub use models::{ComponentHealth, ComponentStatus, HealthCheckResponse};
