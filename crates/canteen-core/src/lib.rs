//! Canteen Core - Domain models, configuration and shared types
//!
//! This crate defines the core abstractions used throughout the canteen backend:
//! - Canteen resources (shops, menus, owners, orders, roles)
//! - Common error types
//! - Configuration management
//! - Public identifier obfuscation

pub mod config;
pub mod ids;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use ids::{IdError, PublicId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for canteen operations
#[derive(Error, Debug)]
pub enum CanteenError {
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("bad data request: {0}")]
    BadRequest(String),

    #[error("duplicate item entry: {0}")]
    Conflict(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CanteenError>;

impl From<IdError> for CanteenError {
    fn from(err: IdError) -> Self {
        CanteenError::BadRequest(err.to_string())
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Role name for platform administrators
pub const ROLE_ADMIN: &str = "Admin";

/// Role name for shop owners
pub const ROLE_OWNER: &str = "Owner";

/// Role name for end users placing orders
pub const ROLE_USER: &str = "User";

/// Fine-grained role from the role directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    #[sqlx(rename = "role_id")]
    pub id: Uuid,
    #[sqlx(rename = "role_name")]
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

// ============================================================================
// Canteen Resources
// ============================================================================

/// A canteen shop (stall)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Shop {
    #[sqlx(rename = "shop_id")]
    pub id: Uuid,
    #[sqlx(rename = "shop_name")]
    pub name: String,
    #[sqlx(rename = "shop_description")]
    pub description: String,
    #[sqlx(rename = "shop_photo_link")]
    pub photo_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            photo_link: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_photo_link(mut self, link: impl Into<String>) -> Self {
        self.photo_link = link.into();
        self
    }
}

/// A menu item sold by a shop
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Menu {
    #[sqlx(rename = "menu_id")]
    pub id: Uuid,
    #[sqlx(rename = "menu_name")]
    pub name: String,
    #[sqlx(rename = "menu_shop_id")]
    pub shop_id: Uuid,
    #[sqlx(rename = "menu_price")]
    pub price: i64,
    #[sqlx(rename = "menu_status")]
    pub status: String,
    #[sqlx(rename = "menu_photo_link")]
    pub photo_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Menu {
    pub fn new(name: impl Into<String>, shop_id: Uuid, price: i64, status: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            shop_id,
            price,
            status: status.into(),
            photo_link: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A back-office account (shop owner or administrator)
///
/// `password` holds the argon2 PHC hash and is never serialized.
/// `role_id` points into the role directory.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Owner {
    #[sqlx(rename = "owner_id")]
    pub id: Uuid,
    pub fullname: String,
    pub wa_number: String,
    pub username: String,
    pub password: String,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(
        fullname: impl Into<String>,
        wa_number: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            fullname: fullname.into(),
            wa_number: wa_number.into(),
            username: username.into(),
            password: password_hash.into(),
            role_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role_id: Uuid) -> Self {
        self.role_id = role_id;
        self
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Done,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CanteenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "processing" => Ok(Self::Processing),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CanteenError::BadRequest(format!("unknown order status: {s}"))),
        }
    }
}

/// A food order placed by a user
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Order {
    #[sqlx(rename = "order_id")]
    pub id: Uuid,
    #[sqlx(rename = "order_user_id")]
    pub user_id: Uuid,
    #[sqlx(rename = "order_menu_id")]
    pub menu_id: Uuid,
    pub status: String,
    pub payment_method: String,
    pub payment_proof_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: Uuid, menu_id: Uuid, payment_method: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            menu_id,
            status: OrderStatus::Pending.to_string(),
            payment_method: payment_method.into(),
            payment_proof_link: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
