//! Authentication API handlers

use super::ApiJson;
use crate::audit::{extract_ip_address, extract_user_agent};
use crate::auth::{AuthService, ClientInfo, LoginRequest, LoginResponse, Session};
use crate::error::{ApiResponse, AppError};
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, response::IntoResponse, Extension};
use std::sync::Arc;

/// Log in with owner or administrator credentials
///
/// Returns a bearer token carrying the admin role class and the account's
/// role id.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 403, description = "Invalid credentials"),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = ClientInfo {
        ip_address: extract_ip_address(&headers),
        user_agent: extract_user_agent(&headers),
    };

    let response = AuthService::new(state).login(request, client).await?;
    Ok(ApiResponse::ok("successfully logged in", response))
}

/// Revoke the presented session token
///
/// The token stays in the revocation store until it would have expired, and
/// is rejected as expired from then on.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Missing, invalid or already revoked token"),
        (status = 500, description = "Revocation store unavailable"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    AuthService::new(state)
        .logout(&session, extract_ip_address(&headers))
        .await?;

    Ok(ApiResponse::<()>::message("successfully logged out"))
}
