use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use serde::Serialize;
use sqlx::PgPool;

use crate::configuration::{DefaultAdminSettings, JwtSettings};
use crate::connectors::{issue_token, JwtClaims, JwtError};
use crate::db;
use crate::models::AdminUser;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error("Failed to hash password")]
    Hashing,
    #[error("{0}")]
    Storage(String),
}

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: i64,
    pub user: AdminUser,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|_| AuthError::Hashing)?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("Password hashing failed: {}", err);
            AuthError::Hashing
        })
}

/// False for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[tracing::instrument(name = "Admin login.", skip(pool, settings, password))]
pub async fn login(
    pool: &PgPool,
    settings: &JwtSettings,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    let user = db::admin_user::fetch_by_username(pool, username)
        .await
        .map_err(AuthError::Storage)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        tracing::warn!("Failed login attempt for {}", username);
        return Err(AuthError::InvalidCredentials);
    }

    let claims = JwtClaims::for_admin(user.id, &user.username, settings);
    let token = issue_token(&claims, &settings.secret)?;

    Ok(LoginOutcome {
        token,
        expires_in: settings.expires_in_secs,
        user,
    })
}

/// Seed the configured admin account when no admin exists yet.
pub async fn ensure_default_admin(
    pool: &PgPool,
    settings: &DefaultAdminSettings,
) -> Result<Option<AdminUser>, AuthError> {
    let admins = db::admin_user::count(pool)
        .await
        .map_err(AuthError::Storage)?;
    if admins > 0 {
        return Ok(None);
    }

    let password_hash = hash_password(&settings.password)?;
    let admin = db::admin_user::insert(pool, &settings.username, &password_hash)
        .await
        .map_err(AuthError::Storage)?;
    tracing::info!("Default admin user '{}' created", admin.username);

    Ok(Some(admin))
}
