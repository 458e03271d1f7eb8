//! Application state management

use crate::auth::revocation::{MemoryRevocationStore, RevocationStore};
use crate::auth::roles::{MemoryRoleDirectory, RoleDirectory};
use crate::auth::token::TokenConfig;
use crate::repository::Repositories;
use canteen_core::config::AppConfig;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers and middleware
///
/// Built once at startup and handed to the router as `Arc<AppState>`.
/// Everything in it is either immutable or internally synchronized.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Token signing parameters derived from `config.auth`
    pub tokens: TokenConfig,
    /// Revoked-token store
    pub revocation: Arc<dyn RevocationStore>,
    /// Role lookup for authorization
    pub roles: Arc<dyn RoleDirectory>,
    /// Resource repositories
    pub repos: Repositories,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        revocation: Arc<dyn RevocationStore>,
        roles: Arc<dyn RoleDirectory>,
        repos: Repositories,
    ) -> Self {
        let tokens = TokenConfig::from(&config.auth);
        Self {
            config,
            tokens,
            revocation,
            roles,
            repos,
            start_time: Instant::now(),
        }
    }

    /// State backed entirely by in-process stores, with the three standard
    /// roles seeded
    pub fn in_memory(config: AppConfig) -> Self {
        let roles: Arc<dyn RoleDirectory> = Arc::new(MemoryRoleDirectory::standard());
        Self::new(
            config,
            Arc::new(MemoryRevocationStore::new()),
            roles.clone(),
            Repositories::in_memory(roles),
        )
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(AppConfig::default())
    }
}
