use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Checks slower than this are reported as degraded.
pub const SLOW_RESPONSE_THRESHOLD_MS: u64 = 1000;

/// Ordered from best to worst, so the overall status is the `max` of the parts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
    pub last_checked: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ComponentHealth {
    fn with_status(
        status: ComponentStatus,
        message: Option<String>,
        response_time_ms: Option<u64>,
    ) -> Self {
        Self {
            status,
            message,
            response_time_ms,
            last_checked: Utc::now(),
            details: None,
        }
    }

    pub fn healthy(response_time_ms: u64) -> Self {
        Self::with_status(ComponentStatus::Healthy, None, Some(response_time_ms))
    }

    /// Healthy, or degraded with "`<component>` responding slowly" past the threshold.
    pub fn timed(component: &str, response_time_ms: u64) -> Self {
        if response_time_ms > SLOW_RESPONSE_THRESHOLD_MS {
            Self::degraded(
                format!("{} responding slowly", component),
                Some(response_time_ms),
            )
        } else {
            Self::healthy(response_time_ms)
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(error.into()), None)
    }

    pub fn degraded(message: impl Into<String>, response_time_ms: Option<u64>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()), response_time_ms)
    }

    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value);
        self
    }
}

/// Body of `/api/health/components`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: ComponentStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthCheckResponse {
    pub fn new(version: String, uptime_seconds: u64) -> Self {
        Self {
            status: ComponentStatus::Healthy,
            timestamp: Utc::now(),
            version,
            uptime_seconds,
            components: BTreeMap::new(),
        }
    }

    pub fn add_component(&mut self, name: &str, health: ComponentHealth) {
        self.status = self.status.max(health.status);
        self.components.insert(name.to_string(), health);
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ComponentStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_status_is_the_worst_component() {
        let mut response = HealthCheckResponse::new("1.0.0".to_string(), 3);
        response.add_component("database", ComponentHealth::healthy(4));
        assert!(response.is_healthy());

        response.add_component("ai_pipeline", ComponentHealth::degraded("slow", None));
        assert_eq!(response.status, ComponentStatus::Degraded);

        response.add_component("storage", ComponentHealth::unhealthy("gone"));
        response.add_component("extra", ComponentHealth::healthy(1));
        assert_eq!(response.status, ComponentStatus::Unhealthy);
    }

    #[test]
    fn slow_checks_are_degraded() {
        assert_eq!(ComponentHealth::timed("Database", 12).status, ComponentStatus::Healthy);
        let slow = ComponentHealth::timed("Database", 2500);
        assert_eq!(slow.status, ComponentStatus::Degraded);
        assert_eq!(slow.message.as_deref(), Some("Database responding slowly"));
    }

    #[test]
    fn components_serialize_in_name_order() {
        let mut response = HealthCheckResponse::new("1.0.0".to_string(), 0);
        response.add_component("storage", ComponentHealth::healthy(1));
        response.add_component("ai_pipeline", ComponentHealth::healthy(1));

        let value = serde_json::to_value(&response).unwrap();
        let names: Vec<&String> = value["components"].as_object().unwrap().keys().collect();
        assert_eq!(names, vec!["ai_pipeline", "storage"]);
        assert_eq!(value["status"], "healthy");
    }
}
