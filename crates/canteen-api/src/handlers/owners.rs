//! Owner account handlers

use super::ApiJson;
use crate::auth::AuthContext;
use crate::error::{ApiResponse, AppError};
use crate::service::{Actor, CreateOwnerRequest, OwnerResponse, OwnerService, UpdateOwnerRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use canteen_core::Role;
use std::sync::Arc;

fn service(state: &AppState) -> OwnerService {
    OwnerService::new(&state.repos, state.roles.clone())
}

fn actor(ctx: &AuthContext, role: Role) -> Actor {
    Actor {
        id: ctx.id,
        role: role.name,
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/owners",
    tag = "owners",
    responses(
        (status = 200, description = "All owners", body = [OwnerResponse]),
        (status = 403, description = "Admin role required"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_owners(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let owners = service(&state).fetch_all().await?;
    Ok(ApiResponse::ok("successfully fetch all owners", owners))
}

#[utoipa::path(
    get,
    path = "/api/v1/owners/{id}",
    tag = "owners",
    params(("id" = String, Path, description = "Encoded owner id")),
    responses(
        (status = 200, description = "Owner found", body = OwnerResponse),
        (status = 403, description = "Not an admin and not the account holder"),
        (status = 404, description = "Owner not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_owner(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Extension(role): Extension<Role>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let owner = service(&state)
        .fetch_by_id(&actor(&ctx, role), &id)
        .await?;
    Ok(ApiResponse::ok("successfully fetch owner by id", owner))
}

#[utoipa::path(
    post,
    path = "/api/v1/owners",
    tag = "owners",
    request_body = CreateOwnerRequest,
    responses(
        (status = 201, description = "Owner created", body = OwnerResponse),
        (status = 400, description = "Invalid body"),
        (status = 409, description = "Username taken"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_owner(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner = service(&state).create(request).await?;
    Ok(ApiResponse::created("successfully create new owner", owner))
}

#[utoipa::path(
    put,
    path = "/api/v1/owners/{id}",
    tag = "owners",
    params(("id" = String, Path, description = "Encoded owner id")),
    request_body = UpdateOwnerRequest,
    responses(
        (status = 200, description = "Owner updated"),
        (status = 403, description = "Not an admin and not the account holder"),
        (status = 404, description = "Owner not found"),
        (status = 409, description = "Username taken"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_owner(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Extension(role): Extension<Role>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    service(&state)
        .update(&actor(&ctx, role), &id, request)
        .await?;
    Ok(ApiResponse::<()>::message("successfully update owner"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/owners/{id}",
    tag = "owners",
    params(("id" = String, Path, description = "Encoded owner id")),
    responses(
        (status = 200, description = "Owner deleted"),
        (status = 404, description = "Owner not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete(&id).await?;
    Ok(ApiResponse::<()>::message("successfully delete owner"))
}
