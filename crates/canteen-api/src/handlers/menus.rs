//! Menu handlers
//!
//! Listing and reading menus is public; changes need an `Admin` or `Owner`.

use super::ApiJson;
use crate::error::{ApiResponse, AppError};
use crate::service::{MenuRequest, MenuResponse, MenuService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct MenuQuery {
    /// Encoded shop id to filter by
    pub shop_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/menus",
    tag = "menus",
    params(MenuQuery),
    responses(
        (status = 200, description = "Menus", body = [MenuResponse]),
        (status = 400, description = "Malformed shop id"),
    )
)]
pub async fn list_menus(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, AppError> {
    let menus = MenuService::new(&state.repos)
        .fetch_all(query.shop_id.as_deref())
        .await?;
    Ok(ApiResponse::ok("successfully fetch all menus", menus))
}

#[utoipa::path(
    get,
    path = "/api/v1/menus/{id}",
    tag = "menus",
    params(("id" = String, Path, description = "Encoded menu id")),
    responses(
        (status = 200, description = "Menu found", body = MenuResponse),
        (status = 404, description = "Menu not found"),
    )
)]
pub async fn get_menu(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let menu = MenuService::new(&state.repos).fetch_by_id(&id).await?;
    Ok(ApiResponse::ok("successfully fetch menu by id", menu))
}

#[utoipa::path(
    post,
    path = "/api/v1/menus",
    tag = "menus",
    request_body = MenuRequest,
    responses(
        (status = 201, description = "Menu created", body = MenuResponse),
        (status = 400, description = "Invalid body or unknown shop"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_menu(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MenuRequest>,
) -> Result<impl IntoResponse, AppError> {
    let menu = MenuService::new(&state.repos).create(request).await?;
    Ok(ApiResponse::created("successfully create new menu", menu))
}

#[utoipa::path(
    put,
    path = "/api/v1/menus/{id}",
    tag = "menus",
    params(("id" = String, Path, description = "Encoded menu id")),
    request_body = MenuRequest,
    responses(
        (status = 200, description = "Menu updated"),
        (status = 404, description = "Menu not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_menu(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<MenuRequest>,
) -> Result<impl IntoResponse, AppError> {
    MenuService::new(&state.repos).update(&id, request).await?;
    Ok(ApiResponse::<()>::message("successfully update menu"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/menus/{id}",
    tag = "menus",
    params(("id" = String, Path, description = "Encoded menu id")),
    responses(
        (status = 200, description = "Menu deleted"),
        (status = 404, description = "Menu not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_menu(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    MenuService::new(&state.repos).delete(&id).await?;
    Ok(ApiResponse::<()>::message("successfully delete menu"))
}
