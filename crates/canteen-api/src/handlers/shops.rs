//! Shop handlers

use super::ApiJson;
use crate::error::{ApiResponse, AppError};
use crate::service::{ShopRequest, ShopResponse, ShopService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;

/// List all shops
#[utoipa::path(
    get,
    path = "/api/v1/shops",
    tag = "shops",
    responses(
        (status = 200, description = "All shops", body = [ShopResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shops(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let shops = ShopService::new(&state.repos).fetch_all().await?;
    Ok(ApiResponse::ok("successfully fetch all shops", shops))
}

/// Get a shop by its encoded id
#[utoipa::path(
    get,
    path = "/api/v1/shops/{id}",
    tag = "shops",
    params(("id" = String, Path, description = "Encoded shop id")),
    responses(
        (status = 200, description = "Shop found", body = ShopResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Shop not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let shop = ShopService::new(&state.repos).fetch_by_id(&id).await?;
    Ok(ApiResponse::ok("successfully fetch shop by id", shop))
}

/// Create a shop
#[utoipa::path(
    post,
    path = "/api/v1/shops",
    tag = "shops",
    request_body = ShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ShopResponse),
        (status = 400, description = "Invalid body"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_shop(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ShopRequest>,
) -> Result<impl IntoResponse, AppError> {
    let shop = ShopService::new(&state.repos).create(request).await?;
    Ok(ApiResponse::created("successfully create new shop", shop))
}

/// Update a shop's profile
#[utoipa::path(
    put,
    path = "/api/v1/shops/{id}",
    tag = "shops",
    params(("id" = String, Path, description = "Encoded shop id")),
    request_body = ShopRequest,
    responses(
        (status = 200, description = "Shop updated"),
        (status = 404, description = "Shop not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ShopRequest>,
) -> Result<impl IntoResponse, AppError> {
    ShopService::new(&state.repos).update(&id, request).await?;
    Ok(ApiResponse::<()>::message("successfully update shop"))
}

/// Delete a shop
#[utoipa::path(
    delete,
    path = "/api/v1/shops/{id}",
    tag = "shops",
    params(("id" = String, Path, description = "Encoded shop id")),
    responses(
        (status = 200, description = "Shop deleted"),
        (status = 404, description = "Shop not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ShopService::new(&state.repos).delete(&id).await?;
    Ok(ApiResponse::<()>::message("successfully delete shop"))
}

/// Assign an owner to a shop
#[utoipa::path(
    post,
    path = "/api/v1/shops/{id}/owners/{owner_id}",
    tag = "shops",
    params(
        ("id" = String, Path, description = "Encoded shop id"),
        ("owner_id" = String, Path, description = "Encoded owner id"),
    ),
    responses(
        (status = 200, description = "Owner assigned"),
        (status = 404, description = "Shop or owner not found"),
        (status = 409, description = "Owner already assigned"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_shop_owner(
    State(state): State<Arc<AppState>>,
    Path((id, owner_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ShopService::new(&state.repos)
        .add_owner(&id, &owner_id)
        .await?;
    Ok(ApiResponse::<()>::message("successfully assigned owner to shop"))
}

/// Remove an owner from a shop
#[utoipa::path(
    delete,
    path = "/api/v1/shops/{id}/owners/{owner_id}",
    tag = "shops",
    params(
        ("id" = String, Path, description = "Encoded shop id"),
        ("owner_id" = String, Path, description = "Encoded owner id"),
    ),
    responses(
        (status = 200, description = "Owner removed"),
        (status = 404, description = "Assignment not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_shop_owner(
    State(state): State<Arc<AppState>>,
    Path((id, owner_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ShopService::new(&state.repos)
        .remove_owner(&id, &owner_id)
        .await?;
    Ok(ApiResponse::<()>::message("successfully remove owner from shop"))
}
