//! Menu service

use super::{must_exist, validated};
use crate::repository::{MenuRepository, Repositories, ShopRepository};
use canteen_core::{ids, Menu, PublicId, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Create or update a menu item
///
/// `shop_id` is the encoded shop identifier. It is ignored on update; a
/// menu item cannot move between shops.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MenuRequest {
    #[validate(length(min = 1, max = 100, message = "menu_name must be 1-100 characters"))]
    pub menu_name: String,
    pub shop_id: PublicId,
    #[validate(range(min = 0, message = "menu_price must not be negative"))]
    pub menu_price: i64,
    #[validate(length(min = 1, message = "menu_status is required"))]
    pub menu_status: String,
    #[serde(default)]
    pub menu_photo_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuResponse {
    pub menu_id: PublicId,
    pub menu_name: String,
    pub shop_id: PublicId,
    pub menu_price: i64,
    pub menu_status: String,
    pub menu_photo_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        Self {
            menu_id: menu.id.into(),
            menu_name: menu.name,
            shop_id: menu.shop_id.into(),
            menu_price: menu.price,
            menu_status: menu.status,
            menu_photo_link: menu.photo_link,
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    shops: Arc<dyn ShopRepository>,
}

impl MenuService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            menus: repos.menus.clone(),
            shops: repos.shops.clone(),
        }
    }

    /// List menus, optionally only those of one (encoded) shop
    pub async fn fetch_all(&self, shop_id: Option<&str>) -> Result<Vec<MenuResponse>> {
        let shop_id = shop_id.map(ids::decode_uuid).transpose()?;
        let menus = self.menus.fetch_all(shop_id).await?;
        Ok(menus.into_iter().map(MenuResponse::from).collect())
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<MenuResponse> {
        let id = ids::decode_uuid(id)?;
        Ok(self.menus.fetch_by_id(id).await?.into())
    }

    pub async fn create(&self, request: MenuRequest) -> Result<MenuResponse> {
        validated(&request)?;

        let shop_id = request.shop_id.uuid();
        must_exist(self.shops.fetch_by_id(shop_id).await, "shop")?;

        let mut menu = Menu::new(
            request.menu_name,
            shop_id,
            request.menu_price,
            request.menu_status,
        );
        menu.photo_link = request.menu_photo_link;
        self.menus.insert(&menu).await?;

        tracing::info!(menu_id = %menu.id, shop_id = %shop_id, "Menu created");
        Ok(menu.into())
    }

    pub async fn update(&self, id: &str, request: MenuRequest) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        validated(&request)?;

        let mut menu = Menu::new(
            request.menu_name,
            request.shop_id.uuid(),
            request.menu_price,
            request.menu_status,
        );
        menu.photo_link = request.menu_photo_link;
        self.menus.update(id, &menu).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        self.menus.delete(id).await
    }
}
