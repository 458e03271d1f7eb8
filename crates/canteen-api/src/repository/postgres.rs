//! PostgreSQL repositories
//!
//! Column aliases map the table layout onto the domain structs' `FromRow`
//! names (`menus.shop_id AS menu_shop_id`, `admins.admin_id AS owner_id`, ...).

use super::{
    ensure_affected, map_db_error, MenuRepository, OrderFilter, OrderRepository, OwnerRepository,
    ShopRepository,
};
use async_trait::async_trait;
use canteen_core::{Menu, Order, Owner, Result, Shop, ROLE_OWNER};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

const SHOP_COLUMNS: &str =
    "shop_id, shop_name, shop_description, shop_photo_link, created_at, updated_at";

const MENU_COLUMNS: &str = "menu_id, menu_name, menus.shop_id AS menu_shop_id, menu_price, \
     menu_status, menu_photo_link, menus.created_at AS created_at, menus.updated_at AS updated_at";

const OWNER_COLUMNS: &str = "admins.admin_id AS owner_id, fullname, wa_number, username, password, \
     admins.role_id AS role_id, admins.created_at AS created_at, admins.updated_at AS updated_at";

const ORDER_COLUMNS: &str = "order_id, user_id AS order_user_id, orders.menu_id AS order_menu_id, \
     status, payment_method, payment_proof_link, orders.created_at AS created_at, \
     orders.updated_at AS updated_at";

/// Shops table
#[derive(Clone)]
pub struct PgShopRepository {
    pool: PgPool,
}

impl PgShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopRepository for PgShopRepository {
    async fn fetch_all(&self) -> Result<Vec<Shop>> {
        sqlx::query_as::<_, Shop>(&format!("SELECT {SHOP_COLUMNS} FROM shops ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("SHOP REPOSITORY][fetch_all", e))
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Shop> {
        sqlx::query_as::<_, Shop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE shop_id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("SHOP REPOSITORY][fetch_by_id", e))
    }

    async fn insert(&self, shop: &Shop) -> Result<()> {
        sqlx::query(
            "INSERT INTO shops (shop_id, shop_name, shop_description, shop_photo_link, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(shop.id)
        .bind(&shop.name)
        .bind(&shop.description)
        .bind(&shop.photo_link)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("SHOP REPOSITORY][insert", e))?;

        Ok(())
    }

    async fn update(&self, id: Uuid, shop: &Shop) -> Result<()> {
        let result = sqlx::query(
            "UPDATE shops SET shop_name = $1, shop_description = $2, shop_photo_link = $3, updated_at = $4 \
             WHERE shop_id = $5",
        )
        .bind(&shop.name)
        .bind(&shop.description)
        .bind(&shop.photo_link)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("SHOP REPOSITORY][update", e))?;

        ensure_affected(result.rows_affected(), "shop")
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM shops WHERE shop_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("SHOP REPOSITORY][delete", e))?;

        ensure_affected(result.rows_affected(), "shop")
    }

    async fn add_owner(&self, shop_id: Uuid, owner_id: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO shop_owners (shop_id, admin_id) VALUES ($1, $2)")
            .bind(shop_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("SHOP REPOSITORY][add_owner", e))?;

        Ok(())
    }

    async fn remove_owner(&self, shop_id: Uuid, owner_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM shop_owners WHERE shop_id = $1 AND admin_id = $2")
            .bind(shop_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("SHOP REPOSITORY][remove_owner", e))?;

        ensure_affected(result.rows_affected(), "shop owner")
    }
}

/// Menus table
#[derive(Clone)]
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn fetch_all(&self, shop_id: Option<Uuid>) -> Result<Vec<Menu>> {
        let query = match shop_id {
            Some(_) => format!("SELECT {MENU_COLUMNS} FROM menus WHERE menus.shop_id = $1 ORDER BY menus.created_at"),
            None => format!("SELECT {MENU_COLUMNS} FROM menus ORDER BY menus.created_at"),
        };

        let mut q = sqlx::query_as::<_, Menu>(&query);
        if let Some(shop_id) = shop_id {
            q = q.bind(shop_id);
        }

        q.fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("MENU REPOSITORY][fetch_all", e))
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Menu> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE menu_id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("MENU REPOSITORY][fetch_by_id", e))
    }

    async fn insert(&self, menu: &Menu) -> Result<()> {
        sqlx::query(
            "INSERT INTO menus (menu_id, menu_name, shop_id, menu_price, menu_status, menu_photo_link, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.shop_id)
        .bind(menu.price)
        .bind(&menu.status)
        .bind(&menu.photo_link)
        .bind(menu.created_at)
        .bind(menu.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("MENU REPOSITORY][insert", e))?;

        Ok(())
    }

    async fn update(&self, id: Uuid, menu: &Menu) -> Result<()> {
        let result = sqlx::query(
            "UPDATE menus SET menu_name = $1, menu_price = $2, menu_status = $3, menu_photo_link = $4, updated_at = $5 \
             WHERE menu_id = $6",
        )
        .bind(&menu.name)
        .bind(menu.price)
        .bind(&menu.status)
        .bind(&menu.photo_link)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("MENU REPOSITORY][update", e))?;

        ensure_affected(result.rows_affected(), "menu")
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM menus WHERE menu_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("MENU REPOSITORY][delete", e))?;

        ensure_affected(result.rows_affected(), "menu")
    }
}

/// Owner accounts, stored in the `admins` table
#[derive(Clone)]
pub struct PgOwnerRepository {
    pool: PgPool,
}

impl PgOwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn fetch_all(&self) -> Result<Vec<Owner>> {
        sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM admins \
             JOIN roles ON roles.role_id = admins.role_id \
             WHERE roles.role_name = $1 ORDER BY admins.created_at"
        ))
        .bind(ROLE_OWNER)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("OWNER REPOSITORY][fetch_all", e))
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Owner> {
        sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM admins \
             JOIN roles ON roles.role_id = admins.role_id \
             WHERE admins.admin_id = $1 AND roles.role_name = $2 LIMIT 1"
        ))
        .bind(id)
        .bind(ROLE_OWNER)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("OWNER REPOSITORY][fetch_by_id", e))
    }

    async fn fetch_by_username(&self, username: &str) -> Result<Owner> {
        sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM admins WHERE username = $1 LIMIT 1"
        ))
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("OWNER REPOSITORY][fetch_by_username", e))
    }

    async fn insert(&self, owner: &Owner) -> Result<()> {
        sqlx::query(
            "INSERT INTO admins (admin_id, fullname, wa_number, username, password, role_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(owner.id)
        .bind(&owner.fullname)
        .bind(&owner.wa_number)
        .bind(&owner.username)
        .bind(&owner.password)
        .bind(owner.role_id)
        .bind(owner.created_at)
        .bind(owner.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("OWNER REPOSITORY][insert", e))?;

        Ok(())
    }

    async fn update(&self, id: Uuid, owner: &Owner) -> Result<()> {
        let result = sqlx::query(
            "UPDATE admins SET fullname = $1, wa_number = $2, username = $3, \
             password = COALESCE(NULLIF($4, ''), password), updated_at = $5 \
             WHERE admin_id = $6 AND role_id IN (SELECT role_id FROM roles WHERE role_name = $7)",
        )
        .bind(&owner.fullname)
        .bind(&owner.wa_number)
        .bind(&owner.username)
        .bind(&owner.password)
        .bind(Utc::now())
        .bind(id)
        .bind(ROLE_OWNER)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("OWNER REPOSITORY][update", e))?;

        ensure_affected(result.rows_affected(), "owner")
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM admins WHERE admin_id = $1 \
             AND role_id IN (SELECT role_id FROM roles WHERE role_name = $2)",
        )
        .bind(id)
        .bind(ROLE_OWNER)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("OWNER REPOSITORY][delete", e))?;

        ensure_affected(result.rows_affected(), "owner")
    }
}

/// Orders table
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn fetch_all(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             LEFT JOIN menus ON menus.menu_id = orders.menu_id \
             WHERE ($1::uuid IS NULL OR orders.user_id = $1) \
             AND ($2::uuid IS NULL OR menus.shop_id = $2) \
             ORDER BY orders.created_at"
        ))
        .bind(filter.user_id)
        .bind(filter.shop_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("ORDER REPOSITORY][fetch_all", e))
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Order> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("ORDER REPOSITORY][fetch_by_id", e))
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "INSERT INTO orders (order_id, user_id, menu_id, status, payment_method, payment_proof_link, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.menu_id)
        .bind(&order.status)
        .bind(&order.payment_method)
        .bind(&order.payment_proof_link)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("ORDER REPOSITORY][insert", e))?;

        Ok(())
    }

    async fn update(&self, id: Uuid, order: &Order) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, payment_method = $2, payment_proof_link = $3, updated_at = $4 \
             WHERE order_id = $5",
        )
        .bind(&order.status)
        .bind(&order.payment_method)
        .bind(&order.payment_proof_link)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("ORDER REPOSITORY][update", e))?;

        ensure_affected(result.rows_affected(), "order")
    }

    async fn delete(&self, id: Uuid, user_id: Option<Uuid>) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM orders WHERE order_id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("ORDER REPOSITORY][delete", e))?;

        ensure_affected(result.rows_affected(), "order")
    }
}
