//! Role directory
//!
//! Resolves the fine-grained role carried in a session token to a [`Role`].
//! Roles live in the `roles` table (`role_id`, `role_name`).

use async_trait::async_trait;
use canteen_core::{Role, ROLE_ADMIN, ROLE_OWNER, ROLE_USER};
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Role lookup errors
#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Role not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lookup capability over the role directory
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Role, RoleError>;

    async fn find_by_name(&self, name: &str) -> Result<Role, RoleError>;

    /// Resolve a token's role claim, which may hold either a role id or a role name
    async fn resolve(&self, identifier: &str) -> Result<Role, RoleError> {
        match Uuid::parse_str(identifier) {
            Ok(id) => self.find_by_id(id).await,
            Err(_) => self.find_by_name(identifier).await,
        }
    }
}

/// PostgreSQL-backed role directory
#[derive(Clone)]
pub struct PgRoleDirectory {
    pool: PgPool,
}

impl PgRoleDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PgRoleDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Role, RoleError> {
        sqlx::query_as::<_, Role>("SELECT role_id, role_name FROM roles WHERE role_id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "[ROLE REPOSITORY][find_by_id] failed to fetch role");
                RoleError::Database(e)
            })?
            .ok_or_else(|| RoleError::NotFound(id.to_string()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Role, RoleError> {
        sqlx::query_as::<_, Role>(
            "SELECT role_id, role_name FROM roles WHERE role_name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "[ROLE REPOSITORY][find_by_name] failed to fetch role");
            RoleError::Database(e)
        })?
        .ok_or_else(|| RoleError::NotFound(name.to_string()))
    }
}

/// In-memory role directory for tests and local runs
#[derive(Default)]
pub struct MemoryRoleDirectory {
    roles: RwLock<HashMap<Uuid, Role>>,
}

impl MemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory with the given role names, returning it with their ids
    pub fn with_roles(names: &[&str]) -> Self {
        let roles = names
            .iter()
            .map(|name| {
                let role = Role::new(*name);
                (role.id, role)
            })
            .collect();
        Self {
            roles: RwLock::new(roles),
        }
    }

    /// Directory holding the `Admin`, `Owner` and `User` roles
    pub fn standard() -> Self {
        Self::with_roles(&[ROLE_ADMIN, ROLE_OWNER, ROLE_USER])
    }

    pub async fn insert(&self, role: Role) {
        self.roles.write().await.insert(role.id, role);
    }
}

#[async_trait]
impl RoleDirectory for MemoryRoleDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Role, RoleError> {
        self.roles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RoleError::NotFound(id.to_string()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Role, RoleError> {
        self.roles
            .read()
            .await
            .values()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| RoleError::NotFound(name.to_string()))
    }
}
