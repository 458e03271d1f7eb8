//! Repository layer for canteen resources
//!
//! Each resource has a repository trait with a PostgreSQL implementation
//! ([`postgres`]) and an in-process implementation ([`memory`]) used by tests
//! and by local runs without a database.
//!
//! Repositories speak in internal UUIDs; id encoding happens in the service
//! layer. Updates and deletes that touch no row report `NotFound`.

pub mod memory;
pub mod postgres;

use crate::auth::roles::RoleDirectory;
use async_trait::async_trait;
use canteen_core::{CanteenError, Menu, Order, Owner, Result, Shop};
use std::sync::Arc;
use uuid::Uuid;

pub use memory::{MemoryMenuRepository, MemoryOrderRepository, MemoryOwnerRepository, MemoryShopRepository};
pub use postgres::{PgMenuRepository, PgOrderRepository, PgOwnerRepository, PgShopRepository};

/// Shop persistence
#[async_trait]
pub trait ShopRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Shop>>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Shop>;

    async fn insert(&self, shop: &Shop) -> Result<()>;

    /// Overwrite name, description and photo link
    async fn update(&self, id: Uuid, shop: &Shop) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Assign an owner account to a shop
    async fn add_owner(&self, shop_id: Uuid, owner_id: Uuid) -> Result<()>;

    async fn remove_owner(&self, shop_id: Uuid, owner_id: Uuid) -> Result<()>;
}

/// Menu persistence
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// List menus, optionally restricted to one shop
    async fn fetch_all(&self, shop_id: Option<Uuid>) -> Result<Vec<Menu>>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Menu>;

    async fn insert(&self, menu: &Menu) -> Result<()>;

    /// Overwrite name, price, status and photo link
    async fn update(&self, id: Uuid, menu: &Menu) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Owner account persistence
///
/// Every query except [`fetch_by_username`](OwnerRepository::fetch_by_username)
/// only sees accounts holding the `Owner` role.
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Owner>>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Owner>;

    /// Lookup used by login; not restricted to the owner role
    async fn fetch_by_username(&self, username: &str) -> Result<Owner>;

    async fn insert(&self, owner: &Owner) -> Result<()>;

    /// Overwrite profile fields; the password hash only when non-empty
    async fn update(&self, id: Uuid, owner: &Owner) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Order listing restrictions; a `None` field matches everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders placed by this user
    pub user_id: Option<Uuid>,
    /// Only orders for menus of this shop
    pub shop_id: Option<Uuid>,
}

/// Order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn fetch_all(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Order>;

    async fn insert(&self, order: &Order) -> Result<()>;

    /// Overwrite status, payment method and payment proof link
    async fn update(&self, id: Uuid, order: &Order) -> Result<()>;

    /// Delete an order; with `user_id` set, only one placed by that user
    async fn delete(&self, id: Uuid, user_id: Option<Uuid>) -> Result<()>;
}

/// The full set of resource repositories held by the application state
#[derive(Clone)]
pub struct Repositories {
    pub shops: Arc<dyn ShopRepository>,
    pub menus: Arc<dyn MenuRepository>,
    pub owners: Arc<dyn OwnerRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            shops: Arc::new(PgShopRepository::new(pool.clone())),
            menus: Arc::new(PgMenuRepository::new(pool.clone())),
            owners: Arc::new(PgOwnerRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool)),
        }
    }

    /// Empty in-process repositories; owner queries resolve the `Owner`
    /// role through `roles`
    pub fn in_memory(roles: Arc<dyn RoleDirectory>) -> Self {
        let menus: Arc<dyn MenuRepository> = Arc::new(MemoryMenuRepository::new());
        Self {
            shops: Arc::new(MemoryShopRepository::new()),
            menus: menus.clone(),
            owners: Arc::new(MemoryOwnerRepository::new(roles)),
            orders: Arc::new(MemoryOrderRepository::new(menus)),
        }
    }
}

/// Translate a sqlx error into the domain taxonomy
///
/// Constraint violations are caller errors; anything else is logged and
/// surfaced as a database failure.
pub(crate) fn map_db_error(scope: &str, err: sqlx::Error) -> CanteenError {
    match &err {
        sqlx::Error::RowNotFound => CanteenError::NotFound("no matching record".to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CanteenError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() || db.is_check_violation() => {
            CanteenError::BadRequest(db.message().to_string())
        }
        _ => {
            tracing::error!(error = %err, "[{scope}] failed to execute sql statement");
            CanteenError::Database(err.to_string())
        }
    }
}

/// Zero affected rows means the target does not exist
pub(crate) fn ensure_affected(rows: u64, what: &str) -> Result<()> {
    if rows < 1 {
        return Err(CanteenError::NotFound(what.to_string()));
    }
    Ok(())
}
