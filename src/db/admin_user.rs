use crate::models::AdminUser;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<AdminUser>, String> {
    sqlx::query_as::<_, AdminUser>(
        "SELECT id, username, password_hash, created_at, updated_at FROM admin_users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Fetch admin by id", id = %id))
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch admin: {:?}", err);
        "Could not fetch data".to_string()
    })
}

pub async fn fetch_by_username(pool: &PgPool, username: &str) -> Result<Option<AdminUser>, String> {
    sqlx::query_as::<_, AdminUser>(
        r#"SELECT id, username, password_hash, created_at, updated_at
        FROM admin_users WHERE username = $1"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Fetch admin by username", username = %username))
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch admin: {:?}", err);
        "Could not fetch data".to_string()
    })
}

pub async fn insert(pool: &PgPool, username: &str, password_hash: &str) -> Result<AdminUser, String> {
    sqlx::query_as::<_, AdminUser>(
        r#"INSERT INTO admin_users (id, username, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, NOW(), NOW())
        RETURNING id, username, password_hash, created_at, updated_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .instrument(tracing::info_span!("Saving admin into the database", username = %username))
    .await
    .map_err(|err| {
        tracing::error!("Failed to insert admin: {:?}", err);
        "Failed to insert admin".to_string()
    })
}

pub async fn count(pool: &PgPool) -> Result<i64, String> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to count admins: {:?}", err);
            "Could not fetch data".to_string()
        })
}
