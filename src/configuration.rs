use crate::connectors::AiPipelineConfig;
use serde;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    pub frontend_url: String,
    pub ai_pipeline: AiPipelineConfig,
    pub jwt: JwtSettings,
    pub uploads: UploadSettings,
    pub default_admin: DefaultAdminSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct JwtSettings {
    pub secret: String,
    pub expires_in_secs: i64,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_file_size_mb: usize,
    pub allowed_file_types: Vec<String>,
}

impl UploadSettings {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Mime types accepted for upload. Unknown extensions are ignored.
    pub fn allowed_mime_types(&self) -> Vec<&'static str> {
        self.allowed_file_types
            .iter()
            .filter_map(|ext| match ext.trim().to_lowercase().as_str() {
                "pdf" => Some("application/pdf"),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DefaultAdminSettings {
    pub username: String,
    pub password: String,
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;
    apply_env_overrides(&mut config);

    Ok(config)
}

// Secrets and deployment switches never live in configuration.yaml in production
fn apply_env_overrides(config: &mut Settings) {
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        config.jwt.secret = secret;
    }
    if let Some(expires) = std::env::var("JWT_EXPIRES_IN_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
    {
        config.jwt.expires_in_secs = expires;
    }
    if let Ok(url) = std::env::var("AI_PIPELINE_URL") {
        config.ai_pipeline.base_url = url;
    }
    if let Ok(mock) = std::env::var("MOCK_AI_PIPELINE") {
        config.ai_pipeline.mock = matches!(mock.as_str(), "1" | "true" | "TRUE");
    }
    if let Ok(password) = std::env::var("DEFAULT_ADMIN_PASSWORD") {
        config.default_admin.password = password;
    }
    if let Ok(url) = std::env::var("FRONTEND_URL") {
        config.frontend_url = url;
    }
    if let Some(size) = std::env::var("MAX_FILE_SIZE_MB")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
    {
        config.uploads.max_file_size_mb = size;
    }
    if let Ok(types) = std::env::var("ALLOWED_FILE_TYPES") {
        config.uploads.allowed_file_types = types.split(',').map(|t| t.trim().to_string()).collect();
    }
}
