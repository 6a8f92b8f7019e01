//! # Shop Repository
//!
//! A seller owns at most one shop; the `shops_owner_unique` index enforces
//! it even when two create requests race.

use sqlx::SqlitePool;
use tracing::info;

use crate::document;
use crate::error::{DbError, DbResult};
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{PageRequest, Shop};

#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Inserts a new shop.
    ///
    /// ## Errors
    /// - `UniqueViolation` on `owner` when the seller already has a shop
    pub async fn create(&self, shop: &Shop) -> DbResult<()> {
        info!(shop_id = %shop.id, owner = %shop.owner, "Creating shop");

        document::insert(&self.pool, shop)
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation { .. } => DbError::duplicate("owner", &shop.owner),
                other => other,
            })
    }

    pub async fn get(&self, id: &str) -> DbResult<Shop> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Shop>> {
        document::get(&self.pool, id).await
    }

    pub async fn find_by_owner(&self, owner: &str) -> DbResult<Option<Shop>> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT doc FROM shops WHERE json_extract(doc, '$.owner') = ?1")
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;

        raw.as_deref().map(document::decode).transpose()
    }

    pub async fn update(&self, shop: &Shop) -> DbResult<()> {
        document::replace(&self.pool, shop).await
    }

    /// Lists active shops, newest first.
    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Shop>> {
        let filter = Filter::new().eq("$.isActive", true);
        document::find(&self.pool, &filter, Sort::Newest, page).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
