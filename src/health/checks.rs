use super::models::{ComponentHealth, HealthCheckResponse};
use crate::connectors::AiPipelineConnector;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HealthChecker {
    pg_pool: PgPool,
    pipeline: Arc<dyn AiPipelineConnector>,
    pipeline_mock: bool,
    uploads_dir: PathBuf,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(
        pg_pool: PgPool,
        pipeline: Arc<dyn AiPipelineConnector>,
        pipeline_mock: bool,
        uploads_dir: PathBuf,
    ) -> Self {
        Self {
            pg_pool,
            pipeline,
            pipeline_mock,
            uploads_dir,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let version = env!("CARGO_PKG_VERSION").to_string();
        let mut response = HealthCheckResponse::new(version, self.uptime_seconds());

        let (db_result, pipeline_result, storage_result) = tokio::join!(
            timeout(CHECK_TIMEOUT, self.check_database()),
            timeout(CHECK_TIMEOUT, self.check_ai_pipeline()),
            timeout(CHECK_TIMEOUT, self.check_storage()),
        );

        let timed_out = |_| ComponentHealth::unhealthy("Timeout");
        response.add_component("database", db_result.unwrap_or_else(timed_out));
        response.add_component("ai_pipeline", pipeline_result.unwrap_or_else(timed_out));
        response.add_component("storage", storage_result.unwrap_or_else(timed_out));

        response
    }

    #[tracing::instrument(name = "Check database health", skip(self))]
    async fn check_database(&self) -> ComponentHealth {
        let start = Instant::now();

        match sqlx::query("SELECT 1 as health_check")
            .fetch_one(&self.pg_pool)
            .await
        {
            Ok(_) => {
                let pool_size = self.pg_pool.size();
                let idle_connections = self.pg_pool.num_idle();

                ComponentHealth::timed("Database", start.elapsed().as_millis() as u64)
                    .with_detail("pool_size", serde_json::json!(pool_size))
                    .with_detail("idle_connections", serde_json::json!(idle_connections))
            }
            Err(e) => {
                tracing::error!("Database health check failed: {:?}", e);
                ComponentHealth::unhealthy(format!("Database error: {}", e))
            }
        }
    }

    /// An unreachable pipeline degrades the service: questions still get canned answers.
    #[tracing::instrument(name = "Check AI pipeline health", skip(self))]
    async fn check_ai_pipeline(&self) -> ComponentHealth {
        if self.pipeline_mock {
            return ComponentHealth::healthy(0).with_detail("mode", serde_json::json!("mock"));
        }

        let start = Instant::now();
        match self.pipeline.health().await {
            Ok(()) => ComponentHealth::timed("AI pipeline", start.elapsed().as_millis() as u64)
                .with_detail("mode", serde_json::json!("live")),
            Err(e) => {
                tracing::warn!("AI pipeline health check failed: {}", e);
                ComponentHealth::degraded(format!("AI pipeline unavailable: {}", e), None)
            }
        }
    }

    #[tracing::instrument(name = "Check upload storage", skip(self))]
    async fn check_storage(&self) -> ComponentHealth {
        let start = Instant::now();
        match tokio::fs::metadata(&self.uploads_dir).await {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => {
                ComponentHealth::timed("Storage", start.elapsed().as_millis() as u64)
                    .with_detail("dir", serde_json::json!(self.uploads_dir.display().to_string()))
            }
            Ok(_) => ComponentHealth::unhealthy(format!(
                "Upload directory {} is not writable",
                self.uploads_dir.display()
            )),
            Err(e) => ComponentHealth::unhealthy(format!("Upload directory error: {}", e)),
        }
    }
}
