//! Authentication and authorization gates
//!
//! [`authenticate`] turns an `Authorization: <scheme> <token>` header into an
//! [`AuthContext`] in the request extensions, or rejects the request.
//! [`authorize`] runs after it and checks the caller's resolved role against
//! a route's allow-list. [`require_api_key`] guards the whole API with a
//! shared key when one is configured.
//!
//! All three read their collaborators from `Arc<AppState>`, so they are
//! installed with `axum::middleware::from_fn_with_state`:
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use canteen_api::auth::middleware::{authenticate, authorize};
//!
//! let admin_only = Router::new()
//!     .route("/shops", get(list_shops))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), authorize(&["Admin"])))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));
//! ```

use super::token::{self, SessionClaims};
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Caller identity established by [`authenticate`]
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject id from the token
    pub id: Uuid,
    /// Role class (user-class or admin-class)
    pub user: String,
    /// Fine-grained role identifier, resolved by [`authorize`]
    pub role: String,
}

/// The raw bearer token and its claims, kept for logout
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: SessionClaims,
}

/// Pull the token out of `Authorization: <scheme> <token>`
///
/// The scheme name is not checked; the header only has to carry at least two
/// whitespace-separated parts.
fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::BadRequest("missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::BadRequest("invalid authorization header".to_string()))?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(_scheme), Some(token)) => Ok(token.to_string()),
        _ => Err(AppError::BadRequest(
            "invalid authorization header".to_string(),
        )),
    }
}

/// Authentication gate
///
/// Steps, in order; the first failure rejects the request:
/// 1. header present and well formed, else `BadRequest` (no store access)
/// 2. signature, algorithm, expiry and required claims, else `InvalidToken`
/// 3. role class is one of the two configured classes, else `InvalidToken`
/// 4. token absent from the revocation store, else `Expired`; a store error
///    or timeout rejects with `Internal`
/// 5. subject id is a UUID, else `BadRequest`
/// 6. [`AuthContext`] and [`Session`] inserted, request forwarded
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip_address = extract_ip_address(request.headers());
    let user_agent = extract_user_agent(request.headers());

    let token = bearer_token(request.headers())?;

    let claims = match token::validate(&state.tokens, &token) {
        Ok(claims) => claims,
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                reason: e.to_string(),
                ip_address,
                user_agent,
            });
            return Err(e.into());
        }
    };

    if !state.config.auth.accepts_role_class(&claims.role_class) {
        audit_log(&AuditEvent::InvalidToken {
            reason: format!("unknown role class {}", claims.role_class),
            ip_address,
            user_agent,
        });
        return Err(AppError::InvalidToken("invalid token".to_string()));
    }

    match state.revocation.get(&token).await {
        Ok(Some(value)) if !value.is_empty() => {
            audit_log(&AuditEvent::RevokedTokenUsed {
                ip_address,
                user_agent,
            });
            return Err(AppError::Expired);
        }
        Ok(_) => {}
        Err(e) => {
            audit_log(&AuditEvent::StoreUnavailable {
                reason: e.to_string(),
                ip_address,
            });
            return Err(e.into());
        }
    }

    let id = Uuid::parse_str(&claims.subject_id)
        .map_err(|_| AppError::BadRequest("invalid subject id".to_string()))?;

    request.extensions_mut().insert(AuthContext {
        id,
        user: claims.role_class.clone(),
        role: claims.role_id.clone(),
    });
    request.extensions_mut().insert(Session { token, claims });

    Ok(next.run(request).await)
}

type GateFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Authorization gate factory
///
/// The returned middleware resolves the caller's role through the role
/// directory (by id when the claim is a UUID, by name otherwise) and admits
/// the request when the role's name is in `allowed`, inserting the resolved
/// [`Role`](canteen_core::Role) into the request extensions. A missing
/// [`AuthContext`], an unknown role, a lookup failure or a name outside the
/// list all reject with `Unauthorized`.
pub fn authorize(
    allowed: &'static [&'static str],
) -> impl Fn(State<Arc<AppState>>, Request, Next) -> GateFuture + Clone + Send + Sync + 'static {
    move |State(state): State<Arc<AppState>>, request: Request, next: Next| {
        Box::pin(check_role(state, allowed, request, next))
    }
}

async fn check_role(
    state: Arc<AppState>,
    allowed: &'static [&'static str],
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("missing authentication context".to_string()))?;

    let role = match state.roles.resolve(&ctx.role).await {
        Ok(role) => role,
        Err(e) => {
            match &e {
                super::roles::RoleError::Database(_) => {
                    tracing::error!(error = %e, role = %ctx.role, "Role lookup failed");
                }
                super::roles::RoleError::NotFound(_) => {
                    tracing::debug!(role = %ctx.role, "Role not found");
                }
            }
            return Err(AppError::Unauthorized("unknown role".to_string()));
        }
    };

    if !allowed.contains(&role.name.as_str()) {
        audit_log(&AuditEvent::AccessDenied {
            subject_id: ctx.id,
            role: role.name.clone(),
            allowed: allowed.iter().map(|r| r.to_string()).collect(),
            resource: request.uri().path().to_string(),
            ip_address: extract_ip_address(request.headers()),
        });
        return Err(AppError::Unauthorized(format!(
            "role {} is not permitted",
            role.name
        )));
    }

    request.extensions_mut().insert(role);
    Ok(next.run(request).await)
}

/// API key gate
///
/// When `auth.api_key` is configured, `x-api-key` must read
/// `"<scheme> <key>"` with the configured key. Disabled otherwise.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.auth.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1));

    if presented != Some(expected) {
        return Err(AppError::BadRequest("invalid api key".to_string()));
    }

    Ok(next.run(request).await)
}
