use crate::health::HealthChecker;
use crate::helpers::JsonResponse;
use actix_web::{get, web, Responder, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct TelegramHealth {
    pub status: &'static str,
    pub platform: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
}

#[tracing::instrument(name = "Telegram health.", skip(checker))]
#[get("/health")]
pub async fn health_handler(checker: web::Data<Arc<HealthChecker>>) -> Result<impl Responder> {
    Ok(JsonResponse::build()
        .set_item(TelegramHealth {
            status: "healthy",
            platform: "telegram",
            timestamp: Utc::now(),
            uptime: checker.uptime_seconds(),
        })
        .ok("OK"))
}
