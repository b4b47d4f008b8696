//! Password hashing (argon2) and session tokens (HS256 JWT).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use dindinho_config::AuthConfig;
use dindinho_core::entities::User;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const INVALID_TOKEN: &str = "Token inválido ou expirado";

/// JWT payload. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password off the async runtime.
///
/// # Errors
///
/// `ApiError::Internal` if hashing fails or the blocking task panics.
pub async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("hash task: {e}")))?
    .map_err(|e| ApiError::Internal(format!("argon2: {e}")))
}

/// Check a password against a stored PHC hash. A wrong password is `Ok(false)`.
///
/// # Errors
///
/// `ApiError::Internal` if the stored hash is malformed.
pub async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    })
    .await
    .map_err(|e| ApiError::Internal(format!("verify task: {e}")))?
    .map_err(|e| ApiError::Internal(format!("argon2: {e}")))
}

/// Sign a token for `user`, valid for `config.token_ttl_secs`.
///
/// # Errors
///
/// `ApiError::Internal` if signing fails.
pub fn issue_token(config: &AuthConfig, user: &User) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let ttl = i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX);
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        iss: config.issuer.clone(),
        iat: now,
        exp: now.saturating_add(ttl),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("jwt encode: {e}")))
}

/// Verify signature, issuer and expiry.
///
/// # Errors
///
/// `ApiError::Domain(Unauthorized)` for any invalid token.
pub fn verify_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.as_str()]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        ApiError::unauthorized(INVALID_TOKEN)
    })
}
