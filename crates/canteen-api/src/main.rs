//! Canteen API Server
//!
//! REST API server for the canteen ordering backend.

use canteen_api::auth::{
    MemoryRevocationStore, PgRoleDirectory, RedisRevocationStore, RevocationStore,
};
use canteen_api::repository::Repositories;
use canteen_api::{create_router, state::AppState};
use canteen_core::config::{AppConfig, LoggingConfig};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("canteen_api={level},tower_http={level},audit=info", level = logging.level).into()
    });

    if logging.json_format {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    init_tracing(&config.logging);

    // Connect to PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(config.database.postgres_pool_size)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.postgres_url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    // Revocation store
    let op_timeout = Duration::from_millis(config.database.revocation_timeout_ms);
    let revocation: Arc<dyn RevocationStore> = match config.database.redis_url.as_deref() {
        Some(url) => Arc::new(RedisRevocationStore::connect(url, op_timeout).await?),
        None => {
            tracing::warn!(
                "REDIS_URL not set, using in-process revocation store (single instance only)"
            );
            Arc::new(MemoryRevocationStore::new())
        }
    };

    // Create application state
    let addr = config.server.bind_addr();
    let state = Arc::new(AppState::new(
        config,
        revocation,
        Arc::new(PgRoleDirectory::new(pool.clone())),
        Repositories::postgres(pool),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Canteen API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
