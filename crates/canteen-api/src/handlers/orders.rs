//! Order handlers
//!
//! Callers holding the user role class only see and delete their own orders;
//! back-office callers see all of them.

use super::ApiJson;
use crate::auth::AuthContext;
use crate::error::{ApiResponse, AppError};
use crate::service::{CreateOrderRequest, OrderResponse, OrderService, UpdateOrderRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderQuery {
    /// Encoded shop id to filter by
    pub shop_id: Option<String>,
}

/// Restrict end users to their own orders
fn scope(state: &AppState, ctx: &AuthContext) -> Option<Uuid> {
    (ctx.user == state.config.auth.user_role_class).then_some(ctx.id)
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "Orders visible to the caller", body = [OrderResponse]),
        (status = 400, description = "Malformed shop id"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderService::new(&state.repos)
        .fetch_all(scope(&state, &ctx), query.shop_id.as_deref())
        .await?;
    Ok(ApiResponse::ok("successfully fetch all orders", orders))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Encoded order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderService::new(&state.repos)
        .fetch_by_id(scope(&state, &ctx), &id)
        .await?;
    Ok(ApiResponse::ok("successfully fetch order by id", order))
}

/// Place an order as the authenticated caller
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid body or unknown menu"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderService::new(&state.repos)
        .create(ctx.id, request)
        .await?;
    Ok(ApiResponse::created("successfully create new order", order))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Encoded order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    OrderService::new(&state.repos).update(&id, request).await?;
    Ok(ApiResponse::<()>::message("successfully update order"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Encoded order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    OrderService::new(&state.repos)
        .delete(scope(&state, &ctx), &id)
        .await?;
    Ok(ApiResponse::<()>::message("successfully delete order"))
}
