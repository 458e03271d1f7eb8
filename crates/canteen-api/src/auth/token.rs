//! Session token issuing and validation
//!
//! Session tokens are HS256-signed JWTs carrying the subject id, the coarse
//! role class (in `iss`) and the fine-grained role id. Validation is pure:
//! revocation is checked separately by the authentication middleware.

use canteen_core::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// The only accepted signing algorithm
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user or owner id (UUID string)
    #[serde(rename = "userId")]
    pub subject_id: String,
    /// Role class tag (user-class or admin-class)
    #[serde(rename = "iss")]
    pub role_class: String,
    /// Fine-grained role identifier (role id or role name)
    #[serde(rename = "role")]
    pub role_id: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

impl SessionClaims {
    /// Time left until natural expiry, zero if already past
    pub fn remaining_lifetime(&self) -> Duration {
        let now = now_secs().unwrap_or(u64::MAX);
        Duration::from_secs(self.exp.saturating_sub(now))
    }
}

/// Token issuing and validation errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Unexpected signing algorithm")]
    WrongAlgorithm,

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Token lifetime in seconds
    pub expiration_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for TokenConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            secret: auth.jwt_secret.clone(),
            expiration_secs: auth.jwt_expiration_secs,
        }
    }
}

fn now_secs() -> Result<u64, TokenError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Sign a new session token
///
/// # Example
///
/// ```no_run
/// use canteen_api::auth::token::{issue, TokenConfig};
/// use uuid::Uuid;
///
/// let config = TokenConfig::default();
/// let token = issue(&config, Uuid::new_v4(), "canteen-user", "User")
///     .expect("Failed to issue token");
/// ```
pub fn issue(
    config: &TokenConfig,
    subject_id: Uuid,
    role_class: &str,
    role_id: &str,
) -> Result<String, TokenError> {
    let now = now_secs()?;

    let claims = SessionClaims {
        subject_id: subject_id.to_string(),
        role_class: role_class.to_string(),
        role_id: role_id.to_string(),
        iat: now,
        exp: now + config.expiration_secs,
    };

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(TokenError::Encoding)
}

/// Verify a session token and extract its claims
///
/// Only HS256 is accepted; a token whose header names any other algorithm is
/// rejected before the signature is checked. Expiry is enforced with no leeway.
pub fn validate(config: &TokenConfig, token: &str) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iss"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
        _ => TokenError::Malformed(e.to_string()),
    })?;

    Ok(data.claims)
}
