//! # Inventory Adjustment Repository
//!
//! Read side of the adjustment workflow. Opening and reviewing an
//! adjustment may also write the product's stock, so both run through a
//! [`UnitOfWork`](crate::UnitOfWork).

use sqlx::SqlitePool;

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{AdjustmentStatus, AdjustmentType, InventoryAdjustment, PageRequest};

/// Listing filters. Every listing is scoped to one shop.
#[derive(Debug, Clone)]
pub struct AdjustmentQuery {
    pub shop: String,
    pub status: Option<AdjustmentStatus>,
    pub product: Option<String>,
    pub adjustment_type: Option<AdjustmentType>,
}

impl AdjustmentQuery {
    pub fn for_shop(shop: impl Into<String>) -> Self {
        AdjustmentQuery {
            shop: shop.into(),
            status: None,
            product: None,
            adjustment_type: None,
        }
    }

    fn filter(&self) -> Filter {
        Filter::new()
            .eq("$.shop", self.shop.as_str())
            .eq_opt("$.status", self.status.map(|s| s.as_str()))
            .eq_opt("$.product", self.product.clone())
            .eq_opt("$.type", self.adjustment_type.map(|t| t.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    pool: SqlitePool,
}

impl AdjustmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdjustmentRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<InventoryAdjustment> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<InventoryAdjustment>> {
        document::get(&self.pool, id).await
    }

    pub async fn list(
        &self,
        query: &AdjustmentQuery,
        page: PageRequest,
    ) -> DbResult<Page<InventoryAdjustment>> {
        document::find(&self.pool, &query.filter(), Sort::Newest, page).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pawmart_core::types::{NewAdjustment, NewProduct, Product, ProductCategory};
    use pawmart_core::workflow::inventory;
    use pawmart_core::Money;

    fn cat_litter() -> Product {
        NewProduct {
            name: "Cat Litter".to_string(),
            description: String::new(),
            category: ProductCategory::Housing,
            price: Money::from_cents(1299),
            stock: 20,
            images: vec![],
            pet_types: vec![],
            brand: None,
            sku: None,
        }
        .into_product("shop-1")
    }

    fn damaged(product: &Product) -> InventoryAdjustment {
        let request = NewAdjustment {
            product: product.id.clone(),
            adjustment_type: AdjustmentType::Damaged,
            quantity_change: -4,
            damaged_quantity: 4,
            expired_quantity: 0,
            new_stock: 16,
            reason: Some("Torn bags".to_string()),
        };
        inventory::open_adjustment(request, product, "employee-1", chrono::Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_open_and_approve_through_unit_of_work() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = cat_litter();
        db.products().create(&product).await.unwrap();

        // Damaged stock needs the owner's approval.
        let adjustment = damaged(&product);
        assert_eq!(adjustment.status, AdjustmentStatus::Pending);

        let mut uow = db.begin().await.unwrap();
        uow.insert(&adjustment).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(db.products().get(&product.id).await.unwrap().stock, 20);

        let mut stored = db.adjustments().get(&adjustment.id).await.unwrap();
        let new_stock = inventory::review(
            &mut stored,
            AdjustmentStatus::Approved,
            "owner-1",
            None,
            chrono::Utc::now(),
        )
        .unwrap();

        let mut uow = db.begin().await.unwrap();
        assert!(uow.replace_if_status(&stored, "pending").await.unwrap());
        if let Some(stock) = new_stock {
            uow.set_stock(&product.id, stock).await.unwrap();
        }
        uow.commit().await.unwrap();

        assert_eq!(db.products().get(&product.id).await.unwrap().stock, 16);

        let mut query = AdjustmentQuery::for_shop("shop-1");
        query.status = Some(AdjustmentStatus::Approved);
        let page = db.adjustments().list(&query, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].approved_by.as_deref(), Some("owner-1"));
    }

    #[tokio::test]
    async fn test_second_review_of_same_adjustment_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = cat_litter();
        db.products().create(&product).await.unwrap();
        let adjustment = damaged(&product);
        let mut uow = db.begin().await.unwrap();
        uow.insert(&adjustment).await.unwrap();
        uow.commit().await.unwrap();

        // Both reviewers read the pending adjustment before either writes.
        let mut approved = db.adjustments().get(&adjustment.id).await.unwrap();
        let mut rejected = approved.clone();

        let stock = inventory::review(
            &mut approved,
            AdjustmentStatus::Approved,
            "owner-1",
            None,
            chrono::Utc::now(),
        )
        .unwrap();
        let mut uow = db.begin().await.unwrap();
        assert!(uow.replace_if_status(&approved, "pending").await.unwrap());
        uow.set_stock(&product.id, stock.unwrap()).await.unwrap();
        uow.commit().await.unwrap();

        inventory::review(
            &mut rejected,
            AdjustmentStatus::Rejected,
            "owner-1",
            Some("Miscounted".to_string()),
            chrono::Utc::now(),
        )
        .unwrap();
        let mut uow = db.begin().await.unwrap();
        assert!(!uow.replace_if_status(&rejected, "pending").await.unwrap());
        drop(uow);

        let stored = db.adjustments().get(&adjustment.id).await.unwrap();
        assert_eq!(stored.status, AdjustmentStatus::Approved);
        assert_eq!(stored.approved_by.as_deref(), Some("owner-1"));
        assert_eq!(db.products().get(&product.id).await.unwrap().stock, 16);
    }
}
