//! OpenAPI document for the canteen API

use crate::auth::{LoginRequest, LoginResponse};
use crate::handlers::{auth, health, menus, orders, owners, shops};
use crate::handlers::health::{HealthResponse, ReadinessChecks, ReadinessResponse};
use crate::service::{
    CreateOrderRequest, CreateOwnerRequest, MenuRequest, MenuResponse, OrderResponse,
    OwnerResponse, ShopRequest, ShopResponse, UpdateOrderRequest, UpdateOwnerRequest,
};
use canteen_core::{OrderStatus, PublicId};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "canteen-api",
        version = "v1",
        description = "Canteen ordering backend: shops, menus, owners and orders"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        auth::login_handler,
        auth::logout_handler,
        shops::list_shops,
        shops::get_shop,
        shops::create_shop,
        shops::update_shop,
        shops::delete_shop,
        shops::add_shop_owner,
        shops::remove_shop_owner,
        menus::list_menus,
        menus::get_menu,
        menus::create_menu,
        menus::update_menu,
        menus::delete_menu,
        owners::list_owners,
        owners::get_owner,
        owners::create_owner,
        owners::update_owner,
        owners::delete_owner,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order
    ),
    components(schemas(
        PublicId,
        OrderStatus,
        HealthResponse,
        ReadinessChecks,
        ReadinessResponse,
        LoginRequest,
        LoginResponse,
        ShopRequest,
        ShopResponse,
        MenuRequest,
        MenuResponse,
        CreateOwnerRequest,
        UpdateOwnerRequest,
        OwnerResponse,
        CreateOrderRequest,
        UpdateOrderRequest,
        OrderResponse
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "auth", description = "Login and logout"),
        (name = "shops", description = "Shop management"),
        (name = "menus", description = "Menu catalogue"),
        (name = "owners", description = "Shop owner accounts"),
        (name = "orders", description = "Food orders")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
