//! API route definitions
//!
//! Routes are grouped by the gates they sit behind. Within a group,
//! `authenticate` is layered last so it runs before `authorize` and before
//! any per-route layer.

use crate::auth::{authenticate, authorize};
use crate::handlers::{auth, menus, orders, owners, shops};
use crate::rate_limit::limit_per_hour;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use canteen_core::{ROLE_ADMIN, ROLE_OWNER};
use std::sync::Arc;

const ADMIN: &[&str] = &[ROLE_ADMIN];
const ADMIN_OR_OWNER: &[&str] = &[ROLE_ADMIN, ROLE_OWNER];

/// Create API v1 routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/menus", get(menus::list_menus))
        .route("/menus/:id", get(menus::get_menu));

    // Any authenticated caller; placing orders is rate limited per subject
    let place_order = limit_per_hour(
        post(orders::create_order),
        state.config.server.order_rate_limit_per_hour,
    );
    let session_routes = Router::new()
        .route("/auth/logout", post(auth::logout_handler))
        .route("/orders", place_order.get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order).delete(orders::delete_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin_routes = Router::new()
        .route("/shops", get(shops::list_shops).post(shops::create_shop))
        .route("/shops/:id", delete(shops::delete_shop))
        .route(
            "/shops/:id/owners/:owner_id",
            post(shops::add_shop_owner).delete(shops::remove_shop_owner),
        )
        .route("/owners", get(owners::list_owners).post(owners::create_owner))
        .route("/owners/:id", delete(owners::delete_owner))
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize(ADMIN)))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let staff_routes = Router::new()
        .route("/shops/:id", get(shops::get_shop).put(shops::update_shop))
        .route("/menus", post(menus::create_menu))
        .route("/menus/:id", put(menus::update_menu).delete(menus::delete_menu))
        .route("/orders/:id", put(orders::update_order))
        .route("/owners/:id", get(owners::get_owner).put(owners::update_owner))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authorize(ADMIN_OR_OWNER),
        ))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(staff_routes)
}
