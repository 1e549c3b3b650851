use super::models::{ComponentHealth, ComponentStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MetricSnapshot {
    timestamp: DateTime<Utc>,
    component: String,
    status: ComponentStatus,
    response_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComponentStats {
    pub total_checks: usize,
    pub healthy_count: usize,
    pub degraded_count: usize,
    pub unhealthy_count: usize,
    pub uptime_percentage: f64,
    pub avg_response_time_ms: u64,
    pub max_response_time_ms: Option<u64>,
    pub last_checked: DateTime<Utc>,
}

/// Ring of recent component checks, oldest dropped first.
pub struct HealthMetrics {
    snapshots: RwLock<VecDeque<MetricSnapshot>>,
    capacity: usize,
}

impl HealthMetrics {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub async fn record(&self, component: &str, health: &ComponentHealth) {
        let mut snapshots = self.snapshots.write().await;
        if snapshots.len() == self.capacity {
            snapshots.pop_front();
        }
        snapshots.push_back(MetricSnapshot {
            timestamp: health.last_checked,
            component: component.to_string(),
            status: health.status,
            response_time_ms: health.response_time_ms,
        });
    }

    pub async fn component_stats(&self, component: &str) -> Option<ComponentStats> {
        let snapshots = self.snapshots.read().await;
        stats_for(snapshots.iter().filter(|s| s.component == component))
    }

    pub async fn all_stats(&self) -> BTreeMap<String, ComponentStats> {
        let snapshots = self.snapshots.read().await;
        let mut grouped: BTreeMap<&str, Vec<&MetricSnapshot>> = BTreeMap::new();
        for snapshot in snapshots.iter() {
            grouped.entry(snapshot.component.as_str()).or_default().push(snapshot);
        }

        grouped
            .into_iter()
            .filter_map(|(name, group)| {
                stats_for(group.into_iter()).map(|stats| (name.to_string(), stats))
            })
            .collect()
    }
}

fn stats_for<'a>(snapshots: impl Iterator<Item = &'a MetricSnapshot>) -> Option<ComponentStats> {
    let snapshots: Vec<&MetricSnapshot> = snapshots.collect();
    let last = snapshots.last()?;

    let count = |status: ComponentStatus| snapshots.iter().filter(|s| s.status == status).count();
    let total = snapshots.len();
    let healthy = count(ComponentStatus::Healthy);
    let times: Vec<u64> = snapshots.iter().filter_map(|s| s.response_time_ms).collect();

    Some(ComponentStats {
        total_checks: total,
        healthy_count: healthy,
        degraded_count: count(ComponentStatus::Degraded),
        unhealthy_count: count(ComponentStatus::Unhealthy),
        uptime_percentage: (healthy as f64 / total as f64 * 10000.0).round() / 100.0,
        avg_response_time_ms: if times.is_empty() {
            0
        } else {
            times.iter().sum::<u64>() / times.len() as u64
        },
        max_response_time_ms: times.iter().max().copied(),
        last_checked: last.timestamp,
    })
}
