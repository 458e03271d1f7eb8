//! Order service
//!
//! The ordering user is always the authenticated caller; a client cannot
//! place an order on someone else's behalf. Reads and deletes take an
//! optional owner scope: with `Some(user_id)` only that user's orders are
//! visible, and anyone else's order reads as missing.

use super::{must_exist, validated};
use crate::repository::{MenuRepository, OrderFilter, OrderRepository, Repositories};
use canteen_core::{ids, CanteenError, Order, OrderStatus, PublicId, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    pub menu_id: PublicId,
    #[validate(length(min = 1, max = 50, message = "payment_method must be 1-50 characters"))]
    pub payment_method: String,
    #[serde(default)]
    pub payment_proof_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderRequest {
    pub status: OrderStatus,
    #[validate(length(min = 1, max = 50, message = "payment_method must be 1-50 characters"))]
    pub payment_method: String,
    #[serde(default)]
    pub payment_proof_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: PublicId,
    pub user_id: PublicId,
    pub menu_id: PublicId,
    pub status: String,
    pub payment_method: String,
    pub payment_proof_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id.into(),
            user_id: order.user_id.into(),
            menu_id: order.menu_id.into(),
            status: order.status,
            payment_method: order.payment_method,
            payment_proof_link: order.payment_proof_link,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    menus: Arc<dyn MenuRepository>,
}

impl OrderService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            orders: repos.orders.clone(),
            menus: repos.menus.clone(),
        }
    }

    /// List orders within `scope`, optionally for one shop's menus
    pub async fn fetch_all(
        &self,
        scope: Option<Uuid>,
        shop_id: Option<&str>,
    ) -> Result<Vec<OrderResponse>> {
        let filter = OrderFilter {
            user_id: scope,
            shop_id: shop_id.map(ids::decode_uuid).transpose()?,
        };
        let orders = self.orders.fetch_all(filter).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    pub async fn fetch_by_id(&self, scope: Option<Uuid>, id: &str) -> Result<OrderResponse> {
        let id = ids::decode_uuid(id)?;
        let order = self.orders.fetch_by_id(id).await?;
        if scope.is_some_and(|user_id| order.user_id != user_id) {
            return Err(CanteenError::NotFound("order".to_string()));
        }
        Ok(order.into())
    }

    /// Place a `pending` order for `user_id`
    pub async fn create(&self, user_id: Uuid, request: CreateOrderRequest) -> Result<OrderResponse> {
        validated(&request)?;

        let menu_id = request.menu_id.uuid();
        must_exist(self.menus.fetch_by_id(menu_id).await, "menu")?;

        let mut order = Order::new(user_id, menu_id, request.payment_method);
        order.payment_proof_link = request.payment_proof_link;
        self.orders.insert(&order).await?;

        tracing::info!(order_id = %order.id, user_id = %user_id, menu_id = %menu_id, "Order placed");
        Ok(order.into())
    }

    pub async fn update(&self, id: &str, request: UpdateOrderRequest) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        validated(&request)?;

        let current = self.orders.fetch_by_id(id).await?;
        let order = Order {
            status: request.status.to_string(),
            payment_method: request.payment_method,
            payment_proof_link: request.payment_proof_link,
            ..current
        };
        self.orders.update(id, &order).await
    }

    pub async fn delete(&self, scope: Option<Uuid>, id: &str) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        self.orders.delete(id, scope).await
    }
}
