use crate::health::{HealthChecker, HealthMetrics};
use crate::helpers::JsonResponse;
use actix_web::{get, web, HttpResponse, Responder, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[tracing::instrument(name = "Liveness check.", skip(checker))]
#[get("")]
pub async fn health_check(checker: web::Data<Arc<HealthChecker>>) -> Result<impl Responder> {
    let liveness = Liveness {
        status: "OK",
        service: "CampusMitra Backend",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: checker.uptime_seconds(),
        timestamp: Utc::now(),
    };

    Ok(JsonResponse::build().set_item(liveness).ok("OK"))
}

/// Component report. Answers 503 while any component is unhealthy.
#[tracing::instrument(name = "Component health check.", skip(checker, metrics))]
#[get("/components")]
pub async fn components_handler(
    checker: web::Data<Arc<HealthChecker>>,
    metrics: web::Data<Arc<HealthMetrics>>,
) -> HttpResponse {
    let report = checker.check_all().await;
    for (name, health) in report.components.iter() {
        metrics.record(name, health).await;
    }

    let healthy = !matches!(report.status, crate::health::ComponentStatus::Unhealthy);
    let body = JsonResponse::build()
        .set_item(report)
        .ok("Component health")
        .into_inner();

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[tracing::instrument(name = "Health metrics.", skip(metrics))]
#[get("/metrics")]
pub async fn metrics_handler(metrics: web::Data<Arc<HealthMetrics>>) -> Result<impl Responder> {
    let stats = metrics.all_stats().await;
    Ok(JsonResponse::build().set_item(stats).ok("OK"))
}
