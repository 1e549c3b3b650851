use campusmitra::configuration::get_configuration;
use campusmitra::services::auth;
use campusmitra::startup::run;
use campusmitra::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("campusmitra".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration()?;

    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        "Connecting to PostgreSQL"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&settings.database.connection_string())
        .await?;

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    auth::ensure_default_admin(&pg_pool, &settings.default_admin).await?;
    tokio::fs::create_dir_all(&settings.uploads.dir).await?;

    if settings.ai_pipeline.mock {
        tracing::warn!("MOCK_AI_PIPELINE is enabled, answers are canned");
    }

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    run(listener, pg_pool, settings).await?.await?;
    Ok(())
}
