use crate::configuration::Settings;
use crate::connectors::{extract_bearer_token, verify_token, JwtError};
use crate::db;
use crate::middleware::authentication::{get_header, AuthFailure};
use actix_web::dev::ServiceRequest;
use actix_web::{web, HttpMessage};
use sqlx::PgPool;
use std::sync::Arc;

fn reject(req: &ServiceRequest, msg: &str) -> Result<bool, String> {
    req.extensions_mut().insert(AuthFailure(msg.to_string()));
    Ok(false)
}

/// Ok(false) leaves the request anonymous; admin-only scopes turn that into a 401.
#[tracing::instrument(name = "Authenticate admin with JWT", skip(req))]
pub async fn try_jwt(req: &mut ServiceRequest) -> Result<bool, String> {
    let authorization = match get_header::<String>(req, "authorization") {
        Ok(Some(authorization)) => authorization,
        Ok(None) => return Ok(false),
        Err(_) => return reject(req, "Invalid token."),
    };

    let token = match extract_bearer_token(&authorization) {
        Ok(token) => token.to_string(),
        Err(err) => {
            tracing::debug!("Authorization header rejected: {}", err);
            return reject(req, "Invalid token.");
        }
    };

    let settings = req
        .app_data::<web::Data<Settings>>()
        .cloned()
        .ok_or("Settings not found")?;
    let pg_pool = req
        .app_data::<web::Data<PgPool>>()
        .cloned()
        .ok_or("Database pool not found")?;

    let claims = match verify_token(&token, &settings.jwt) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => return reject(req, "Token expired."),
        Err(err) => {
            tracing::warn!("JWT validation failed: {}", err);
            return reject(req, "Invalid token.");
        }
    };

    let admin = match db::admin_user::fetch(pg_pool.get_ref(), claims.user_id).await? {
        Some(admin) => admin,
        None => return reject(req, "Invalid token. User not found."),
    };

    if req.extensions_mut().insert(Arc::new(admin)).is_some() {
        return Err("admin already authenticated".to_string());
    }

    tracing::debug!("JWT authentication successful for {}", claims.username);
    Ok(true)
}
