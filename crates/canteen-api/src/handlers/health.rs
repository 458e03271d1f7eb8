//! Health check handlers

use crate::auth::roles::RoleError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use canteen_core::ROLE_ADMIN;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Key probed in the revocation store by the readiness check
const READINESS_PROBE_KEY: &str = "canteen:readiness-probe";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessChecks {
    pub database: bool,
    pub revocation_store: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

/// Readiness probe - checks the role directory and the revocation store
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "A dependency is unavailable", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = !matches!(
        state.roles.find_by_name(ROLE_ADMIN).await,
        Err(RoleError::Database(_))
    );
    let revocation_store = state.revocation.get(READINESS_PROBE_KEY).await.is_ok();

    let response = ReadinessResponse {
        ready: database && revocation_store,
        checks: ReadinessChecks {
            database,
            revocation_store,
        },
    };

    let status = if response.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
