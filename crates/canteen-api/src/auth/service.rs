//! Authentication service layer
//!
//! Login for back-office accounts (owners and administrators) and logout for
//! any authenticated session.

use super::middleware::Session;
use super::password::verify_password;
use super::token;
use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use crate::state::AppState;
use canteen_core::{CanteenError, PublicId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Issued session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub owner_id: PublicId,
}

/// Where the login attempt came from, for audit records
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Check credentials and issue a session token
    ///
    /// The token carries the admin role class and the account's role id.
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientInfo,
    ) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let fail = |reason: &str| {
            audit_log(&AuditEvent::LoginFailure {
                username: request.username.clone(),
                reason: reason.to_string(),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
            });
            AppError::Unauthorized("invalid username or password".to_string())
        };

        let owner = match self.state.repos.owners.fetch_by_username(&request.username).await {
            Ok(owner) => owner,
            Err(CanteenError::NotFound(_)) => return Err(fail("unknown username")),
            Err(e) => return Err(e.into()),
        };

        let valid = verify_password(&request.password, &owner.password).map_err(|e| {
            tracing::error!(error = %e, owner_id = %owner.id, "Stored password hash is unusable");
            AppError::Internal(format!("Failed to verify password: {e}"))
        })?;
        if !valid {
            return Err(fail("wrong password"));
        }

        let access_token = token::issue(
            &self.state.tokens,
            owner.id,
            &self.state.config.auth.admin_role_class,
            &owner.role_id.to_string(),
        )?;

        audit_log(&AuditEvent::LoginSuccess {
            owner_id: owner.id,
            username: owner.username.clone(),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        });

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.state.tokens.expiration_secs,
            owner_id: PublicId::new(owner.id),
        })
    }

    /// Revoke the presented session token for the rest of its lifetime
    pub async fn logout(&self, session: &Session, ip_address: Option<String>) -> Result<(), AppError> {
        let ttl = session.claims.remaining_lifetime();
        let sentinel = Utc::now().to_rfc3339();

        self.state
            .revocation
            .put(&session.token, &sentinel, ttl)
            .await?;

        if let Ok(subject_id) = uuid::Uuid::parse_str(&session.claims.subject_id) {
            audit_log(&AuditEvent::Logout {
                subject_id,
                ip_address,
            });
        }

        Ok(())
    }
}
