//! In-process repositories
//!
//! Keep records in insertion order behind a `tokio::sync::RwLock`. Uniqueness
//! is enforced where the database schema has a unique constraint (owner
//! usernames, shop-owner pairs) so both implementations report `Conflict`
//! for the same inputs.

use super::{MenuRepository, OrderFilter, OrderRepository, OwnerRepository, ShopRepository};
use crate::auth::roles::{RoleDirectory, RoleError};
use async_trait::async_trait;
use canteen_core::{CanteenError, Menu, Order, Owner, Result, Shop, ROLE_OWNER};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

fn not_found(what: &str) -> CanteenError {
    CanteenError::NotFound(what.to_string())
}

fn duplicate_id(what: &str) -> CanteenError {
    CanteenError::Conflict(format!("{what} id already exists"))
}

#[derive(Default)]
pub struct MemoryShopRepository {
    shops: RwLock<Vec<Shop>>,
    owners: RwLock<HashSet<(Uuid, Uuid)>>,
}

impl MemoryShopRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShopRepository for MemoryShopRepository {
    async fn fetch_all(&self) -> Result<Vec<Shop>> {
        Ok(self.shops.read().await.clone())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Shop> {
        self.shops
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found("shop"))
    }

    async fn insert(&self, shop: &Shop) -> Result<()> {
        let mut shops = self.shops.write().await;
        if shops.iter().any(|s| s.id == shop.id) {
            return Err(duplicate_id("shop"));
        }
        shops.push(shop.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, shop: &Shop) -> Result<()> {
        let mut shops = self.shops.write().await;
        let existing = shops
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("shop"))?;

        existing.name = shop.name.clone();
        existing.description = shop.description.clone();
        existing.photo_link = shop.photo_link.clone();
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut shops = self.shops.write().await;
        let before = shops.len();
        shops.retain(|s| s.id != id);
        if shops.len() == before {
            return Err(not_found("shop"));
        }

        self.owners.write().await.retain(|(shop_id, _)| *shop_id != id);
        Ok(())
    }

    async fn add_owner(&self, shop_id: Uuid, owner_id: Uuid) -> Result<()> {
        if !self.shops.read().await.iter().any(|s| s.id == shop_id) {
            return Err(CanteenError::BadRequest("shop does not exist".to_string()));
        }

        if !self.owners.write().await.insert((shop_id, owner_id)) {
            return Err(CanteenError::Conflict(
                "owner already assigned to shop".to_string(),
            ));
        }
        Ok(())
    }

    async fn remove_owner(&self, shop_id: Uuid, owner_id: Uuid) -> Result<()> {
        if !self.owners.write().await.remove(&(shop_id, owner_id)) {
            return Err(not_found("shop owner"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMenuRepository {
    menus: RwLock<Vec<Menu>>,
}

impl MemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuRepository for MemoryMenuRepository {
    async fn fetch_all(&self, shop_id: Option<Uuid>) -> Result<Vec<Menu>> {
        Ok(self
            .menus
            .read()
            .await
            .iter()
            .filter(|m| shop_id.map_or(true, |id| m.shop_id == id))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Menu> {
        self.menus
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| not_found("menu"))
    }

    async fn insert(&self, menu: &Menu) -> Result<()> {
        let mut menus = self.menus.write().await;
        if menus.iter().any(|m| m.id == menu.id) {
            return Err(duplicate_id("menu"));
        }
        menus.push(menu.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, menu: &Menu) -> Result<()> {
        let mut menus = self.menus.write().await;
        let existing = menus
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found("menu"))?;

        existing.name = menu.name.clone();
        existing.price = menu.price;
        existing.status = menu.status.clone();
        existing.photo_link = menu.photo_link.clone();
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut menus = self.menus.write().await;
        let before = menus.len();
        menus.retain(|m| m.id != id);
        if menus.len() == before {
            return Err(not_found("menu"));
        }
        Ok(())
    }
}

/// Owner accounts
///
/// Like the database implementation, everything except the login lookup only
/// sees accounts holding the `Owner` role.
pub struct MemoryOwnerRepository {
    owners: RwLock<Vec<Owner>>,
    roles: Arc<dyn RoleDirectory>,
}

impl MemoryOwnerRepository {
    pub fn new(roles: Arc<dyn RoleDirectory>) -> Self {
        Self {
            owners: RwLock::new(Vec::new()),
            roles,
        }
    }

    /// Id of the `Owner` role, `None` when the directory lacks it
    async fn owner_role(&self) -> Result<Option<Uuid>> {
        match self.roles.find_by_name(ROLE_OWNER).await {
            Ok(role) => Ok(Some(role.id)),
            Err(RoleError::NotFound(_)) => Ok(None),
            Err(RoleError::Database(e)) => Err(CanteenError::Database(e.to_string())),
        }
    }
}

#[async_trait]
impl OwnerRepository for MemoryOwnerRepository {
    async fn fetch_all(&self) -> Result<Vec<Owner>> {
        let Some(role_id) = self.owner_role().await? else {
            return Ok(Vec::new());
        };

        Ok(self
            .owners
            .read()
            .await
            .iter()
            .filter(|o| o.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Owner> {
        let role_id = self.owner_role().await?;
        self.owners
            .read()
            .await
            .iter()
            .find(|o| o.id == id && Some(o.role_id) == role_id)
            .cloned()
            .ok_or_else(|| not_found("owner"))
    }

    async fn fetch_by_username(&self, username: &str) -> Result<Owner> {
        self.owners
            .read()
            .await
            .iter()
            .find(|o| o.username == username)
            .cloned()
            .ok_or_else(|| not_found("owner"))
    }

    async fn insert(&self, owner: &Owner) -> Result<()> {
        let mut owners = self.owners.write().await;
        if owners.iter().any(|o| o.id == owner.id) {
            return Err(duplicate_id("owner"));
        }
        if owners.iter().any(|o| o.username == owner.username) {
            return Err(CanteenError::Conflict(format!(
                "username {} already taken",
                owner.username
            )));
        }
        owners.push(owner.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, owner: &Owner) -> Result<()> {
        let role_id = self.owner_role().await?;
        let mut owners = self.owners.write().await;
        if owners
            .iter()
            .any(|o| o.id != id && o.username == owner.username)
        {
            return Err(CanteenError::Conflict(format!(
                "username {} already taken",
                owner.username
            )));
        }

        let existing = owners
            .iter_mut()
            .find(|o| o.id == id && Some(o.role_id) == role_id)
            .ok_or_else(|| not_found("owner"))?;

        existing.fullname = owner.fullname.clone();
        existing.wa_number = owner.wa_number.clone();
        existing.username = owner.username.clone();
        if !owner.password.is_empty() {
            existing.password = owner.password.clone();
        }
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let role_id = self.owner_role().await?;
        let mut owners = self.owners.write().await;
        let before = owners.len();
        owners.retain(|o| !(o.id == id && Some(o.role_id) == role_id));
        if owners.len() == before {
            return Err(not_found("owner"));
        }
        Ok(())
    }
}

/// Orders
///
/// Filtering by shop goes through the menu repository, mirroring the
/// `orders LEFT JOIN menus` query of the database implementation.
pub struct MemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
    menus: Arc<dyn MenuRepository>,
}

impl MemoryOrderRepository {
    pub fn new(menus: Arc<dyn MenuRepository>) -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            menus,
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn fetch_all(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let shop_menus: Option<HashSet<Uuid>> = match filter.shop_id {
            Some(shop_id) => Some(
                self.menus
                    .fetch_all(Some(shop_id))
                    .await?
                    .into_iter()
                    .map(|m| m.id)
                    .collect(),
            ),
            None => None,
        };

        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| filter.user_id.map_or(true, |id| o.user_id == id))
            .filter(|o| shop_menus.as_ref().map_or(true, |menus| menus.contains(&o.menu_id)))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Order> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| not_found("order"))
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(duplicate_id("order"));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        let existing = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| not_found("order"))?;

        existing.status = order.status.clone();
        existing.payment_method = order.payment_method.clone();
        existing.payment_proof_link = order.payment_proof_link.clone();
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Option<Uuid>) -> Result<()> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| !(o.id == id && user_id.map_or(true, |u| o.user_id == u)));
        if orders.len() == before {
            return Err(not_found("order"));
        }
        Ok(())
    }
}
