//! Canteen API - REST server
//!
//! Provides HTTP endpoints for shops, menus, owners and orders, guarded by a
//! token authentication and role authorization pipeline.

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod rate_limit;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{http::HeaderValue, middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the application router over the given state
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = routes::api_routes(state.clone()).layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.server.cors_origins)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router over fresh in-memory state
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    testing::TestApp::new().router
}

#[cfg(feature = "test-utils")]
pub mod testing {
    //! In-memory application harness for integration tests

    use super::create_router;
    use crate::auth::revocation::MemoryRevocationStore;
    use crate::auth::roles::{MemoryRoleDirectory, RoleDirectory};
    use crate::auth::token;
    use crate::repository::Repositories;
    use crate::state::AppState;
    use axum::Router;
    use canteen_core::config::AppConfig;
    use canteen_core::ROLE_USER;
    use std::sync::Arc;
    use uuid::Uuid;

    /// A router plus handles on the state behind it
    pub struct TestApp {
        pub router: Router,
        pub state: Arc<AppState>,
        pub revocation: Arc<MemoryRevocationStore>,
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestApp {
        pub fn new() -> Self {
            Self::with_config(AppConfig::default())
        }

        pub fn with_config(config: AppConfig) -> Self {
            let revocation = Arc::new(MemoryRevocationStore::new());
            let roles: Arc<dyn RoleDirectory> = Arc::new(MemoryRoleDirectory::standard());
            let state = Arc::new(AppState::new(
                config,
                revocation.clone(),
                roles.clone(),
                Repositories::in_memory(roles),
            ));

            Self {
                router: create_router(state.clone()),
                state,
                revocation,
            }
        }

        /// Administrative session for a fresh subject holding the named role
        pub fn admin_token(&self, role: &str) -> String {
            self.token_for(
                Uuid::new_v4(),
                &self.state.config.auth.admin_role_class,
                role,
            )
        }

        /// End-user session for the given subject
        pub fn user_token(&self, subject: Uuid) -> String {
            self.token_for(subject, &self.state.config.auth.user_role_class, ROLE_USER)
        }

        pub fn token_for(&self, subject: Uuid, role_class: &str, role: &str) -> String {
            token::issue(&self.state.tokens, subject, role_class, role)
                .expect("failed to issue test token")
        }
    }
}
