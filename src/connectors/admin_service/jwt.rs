use crate::configuration::JwtSettings;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_ROLE: &str = "administrator";

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JwtClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn for_admin(user_id: Uuid, username: &str, settings: &JwtSettings) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_id,
            username: username.to_string(),
            role: ADMIN_ROLE.to_string(),
            iss: settings.issuer.clone(),
            aud: settings.audience.clone(),
            iat: now,
            exp: now + settings.expires_in_secs,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JwtError {
    #[error("Invalid token format")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token issuer or audience")]
    WrongAudience,
    #[error("Failed to sign token")]
    Signing,
}

fn sign(message: &str, secret: &str) -> Result<Vec<u8>, JwtError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| JwtError::Signing)?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Encode and sign the claims as an HS256 token.
pub fn issue_token(claims: &JwtClaims, secret: &str) -> Result<String, JwtError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let header = serde_json::to_vec(&header).map_err(|_| JwtError::Signing)?;
    let payload = serde_json::to_vec(claims).map_err(|_| JwtError::Signing)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = sign(&signing_input, secret)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Check signature, expiry, issuer and audience; return the claims.
pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<JwtClaims, JwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::Malformed);
    }

    let header = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|_| JwtError::Malformed)?;
    let header: JwtHeader = serde_json::from_slice(&header).map_err(|_| JwtError::Malformed)?;
    if header.alg != "HS256" {
        return Err(JwtError::Malformed);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| JwtError::Malformed)?;
    let mut mac =
        HmacSha256::new_from_slice(settings.secret.as_bytes()).map_err(|_| JwtError::Signing)?;
    mac.update(format!("{}.{}", parts[0], parts[1]).as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| JwtError::BadSignature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| JwtError::Malformed)?;
    let claims: JwtClaims = serde_json::from_slice(&payload).map_err(|_| JwtError::Malformed)?;

    if claims.exp < chrono::Utc::now().timestamp() {
        return Err(JwtError::Expired);
    }
    if claims.iss != settings.issuer || claims.aud != settings.audience {
        return Err(JwtError::WrongAudience);
    }

    Ok(claims)
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Result<&str, String> {
    let parts: Vec<&str> = authorization.split_whitespace().collect();
    if parts.len() != 2 {
        return Err("Invalid Authorization header format".to_string());
    }
    if parts[0] != "Bearer" {
        return Err("Expected Bearer scheme in Authorization header".to_string());
    }
    Ok(parts[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret".to_string(),
            expires_in_secs: 3600,
            issuer: "campusmitra-api".to_string(),
            audience: "campusmitra-frontend".to_string(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let settings = settings();
        let claims = JwtClaims::for_admin(Uuid::new_v4(), "admin", &settings);
        let token = issue_token(&claims, &settings.secret).unwrap();

        let verified = verify_token(&token, &settings).unwrap();
        assert_eq!(verified, claims);
        assert_eq!(verified.role, ADMIN_ROLE);
    }

    #[test]
    fn expired_token_is_rejected() {
        let settings = settings();
        let mut claims = JwtClaims::for_admin(Uuid::new_v4(), "admin", &settings);
        claims.exp = chrono::Utc::now().timestamp() - 10;
        let token = issue_token(&claims, &settings.secret).unwrap();

        assert_eq!(verify_token(&token, &settings), Err(JwtError::Expired));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let settings = settings();
        let claims = JwtClaims::for_admin(Uuid::new_v4(), "admin", &settings);
        let token = issue_token(&claims, &settings.secret).unwrap();

        let mut forged = claims.clone();
        forged.username = "root".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(verify_token(&tampered, &settings), Err(JwtError::BadSignature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let settings = settings();
        let claims = JwtClaims::for_admin(Uuid::new_v4(), "admin", &settings);
        let token = issue_token(&claims, "another-secret").unwrap();

        assert_eq!(verify_token(&token, &settings), Err(JwtError::BadSignature));
    }

    #[test]
    fn foreign_audience_is_rejected() {
        let settings = settings();
        let mut claims = JwtClaims::for_admin(Uuid::new_v4(), "admin", &settings);
        claims.aud = "someone-else".to_string();
        let token = issue_token(&claims, &settings.secret).unwrap();

        assert_eq!(verify_token(&token, &settings), Err(JwtError::WrongAudience));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(verify_token("abc", &settings()), Err(JwtError::Malformed));
    }

    #[test]
    fn test_extract_bearer_token() {
        let token = extract_bearer_token("Bearer abc.def.ghi").expect("Failed to extract token");
        assert_eq!(token, "abc.def.ghi");
        assert!(extract_bearer_token("Basic abc").is_err());
        assert!(extract_bearer_token("Bearer").is_err());
    }
}
