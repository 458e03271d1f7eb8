//! Shop service

use super::validated;
use crate::repository::{OwnerRepository, Repositories, ShopRepository};
use canteen_core::{ids, PublicId, Result, Shop};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Create or update a shop
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ShopRequest {
    #[validate(length(min = 1, max = 100, message = "shop_name must be 1-100 characters"))]
    pub shop_name: String,
    #[validate(length(min = 1, message = "shop_description is required"))]
    pub shop_description: String,
    #[serde(default, alias = "shop_photo_link")]
    pub photo_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopResponse {
    pub shop_id: PublicId,
    pub shop_name: String,
    pub shop_description: String,
    pub shop_photo_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Shop> for ShopResponse {
    fn from(shop: Shop) -> Self {
        Self {
            shop_id: shop.id.into(),
            shop_name: shop.name,
            shop_description: shop.description,
            shop_photo_link: shop.photo_link,
            created_at: shop.created_at,
            updated_at: shop.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ShopService {
    shops: Arc<dyn ShopRepository>,
    owners: Arc<dyn OwnerRepository>,
}

impl ShopService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            shops: repos.shops.clone(),
            owners: repos.owners.clone(),
        }
    }

    pub async fn fetch_all(&self) -> Result<Vec<ShopResponse>> {
        let shops = self.shops.fetch_all().await?;
        Ok(shops.into_iter().map(ShopResponse::from).collect())
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<ShopResponse> {
        let id = ids::decode_uuid(id)?;
        Ok(self.shops.fetch_by_id(id).await?.into())
    }

    pub async fn create(&self, request: ShopRequest) -> Result<ShopResponse> {
        validated(&request)?;

        let shop = Shop::new(request.shop_name, request.shop_description)
            .with_photo_link(request.photo_link);
        self.shops.insert(&shop).await?;

        tracing::info!(shop_id = %shop.id, "Shop created");
        Ok(shop.into())
    }

    pub async fn update(&self, id: &str, request: ShopRequest) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        validated(&request)?;

        let shop = Shop::new(request.shop_name, request.shop_description)
            .with_photo_link(request.photo_link);
        self.shops.update(id, &shop).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = ids::decode_uuid(id)?;
        self.shops.delete(id).await
    }

    /// Assign an existing owner account to a shop
    pub async fn add_owner(&self, shop_id: &str, owner_id: &str) -> Result<()> {
        let shop_id = ids::decode_uuid(shop_id)?;
        let owner_id = ids::decode_uuid(owner_id)?;

        self.shops.fetch_by_id(shop_id).await?;
        self.owners.fetch_by_id(owner_id).await?;
        self.shops.add_owner(shop_id, owner_id).await
    }

    pub async fn remove_owner(&self, shop_id: &str, owner_id: &str) -> Result<()> {
        let shop_id = ids::decode_uuid(shop_id)?;
        let owner_id = ids::decode_uuid(owner_id)?;
        self.shops.remove_owner(shop_id, owner_id).await
    }
}
