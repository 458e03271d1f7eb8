//! Resource services
//!
//! Services sit between handlers and repositories. They decode and validate
//! client-supplied identifiers before any repository call, validate request
//! bodies, and convert domain records into response DTOs whose ids are
//! encoded with [`canteen_core::PublicId`]. Raw UUIDs never leave this layer.

pub mod menu;
pub mod order;
pub mod owner;
pub mod shop;

pub use menu::{MenuRequest, MenuResponse, MenuService};
pub use order::{CreateOrderRequest, OrderResponse, OrderService, UpdateOrderRequest};
pub use owner::{Actor, CreateOwnerRequest, OwnerResponse, OwnerService, UpdateOwnerRequest};
pub use shop::{ShopRequest, ShopResponse, ShopService};

use canteen_core::{CanteenError, Result};
use validator::Validate;

/// Run derive-based validation, mapping failures to `BadRequest`
pub(crate) fn validated<T: Validate>(request: &T) -> Result<()> {
    request
        .validate()
        .map_err(|e| CanteenError::BadRequest(e.to_string()))
}

/// A referenced record that does not exist is a caller error, not a 404
pub(crate) fn must_exist<T>(lookup: Result<T>, what: &str) -> Result<T> {
    lookup.map_err(|e| match e {
        CanteenError::NotFound(_) => CanteenError::BadRequest(format!("{what} does not exist")),
        other => other,
    })
}
