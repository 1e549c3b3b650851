use campusmitra::configuration::{get_configuration, DatabaseSettings, Settings};
use campusmitra::services::auth;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use tempfile::TempDir;
use wiremock::MockServer;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    /// Stands in for the AI pipeline; mount expectations per test.
    pub pipeline: MockServer,
    pub uploads: TempDir,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn admin_token(&self) -> String {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(response.status().as_u16(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        body["item"]["token"].as_str().unwrap().to_string()
    }

    pub async fn ask(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/chat/ask"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_app_with_configuration(mut configuration: Settings) -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let pipeline = MockServer::start().await;
    let uploads = tempfile::tempdir().expect("Failed to create uploads dir");
    configuration.ai_pipeline.base_url = pipeline.uri();
    configuration.ai_pipeline.mock = false;
    configuration.uploads.dir = uploads.path().to_path_buf();
    configuration.default_admin.username = ADMIN_USERNAME.to_string();
    configuration.default_admin.password = ADMIN_PASSWORD.to_string();

    auth::ensure_default_admin(&connection_pool, &configuration.default_admin)
        .await
        .expect("Failed to seed admin");

    let server = campusmitra::startup::run(listener, connection_pool.clone(), configuration)
        .await
        .expect("Failed to bind address.");

    let _ = tokio::spawn(server);
    println!("Used Port: {}", port);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        pipeline,
        uploads,
        client: reqwest::Client::new(),
    })
}

pub async fn spawn_app() -> Option<TestApp> {
    let configuration = get_configuration().expect("Failed to get configuration");
    spawn_app_with_configuration(configuration).await
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await?;

    Ok(connection_pool)
}
