//! # Product Repository
//!
//! Database operations for shop products.
//!
//! ## Key Operations
//! - Catalog listing with filters and sorting
//! - CRUD operations
//! - Direct stock overwrite (clamped at zero)
//!
//! ## Stock Writers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who changes Product.stock                                              │
//! │                                                                         │
//! │  POST /api/orders                 UnitOfWork::decrement_stock           │
//! │                                   (conditional: stock >= qty)           │
//! │                                                                         │
//! │  POST /api/inventory/adjustments  UnitOfWork::set_stock                 │
//! │  PUT  …/adjustments/:id/status    (newStock, when approved)             │
//! │                                                                         │
//! │  PUT  /api/products/:id/stock     ProductRepository::set_stock          │
//! │                                   (max(0, value))                       │
//! │                                                                         │
//! │  Each write is one statement; the generic `update` never carries a      │
//! │  stock change from the client.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use crate::unit_of_work;
use pawmart_core::types::{PageRequest, Product, ProductCategory};

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    Price,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// Parses the `sort` query parameter. Unknown values sort newest first.
    pub fn from_param(param: &str) -> Self {
        match param {
            "price" => ProductSort::Price,
            "-price" => ProductSort::PriceDesc,
            "name" => ProductSort::Name,
            _ => ProductSort::Newest,
        }
    }

    fn to_sort(self) -> Sort {
        match self {
            ProductSort::Newest => Sort::Newest,
            ProductSort::Price => Sort::asc("$.price"),
            ProductSort::PriceDesc => Sort::desc("$.price"),
            ProductSort::Name => Sort::asc("$.name"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub shop: Option<String>,
    pub category: Option<ProductCategory>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// In cents.
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// `Some(true)` keeps products with stock > 0, `Some(false)` keeps the
    /// sold-out ones.
    pub in_stock: Option<bool>,
    pub sort: ProductSort,
}

impl ProductQuery {
    fn filter(&self) -> Filter {
        let filter = Filter::new()
            .eq_opt("$.shop", self.shop.clone())
            .eq_opt("$.category", self.category.map(|c| c.as_str()))
            .contains_opt("$.name", self.search.as_deref())
            .gte_opt("$.price", self.min_price)
            .lte_opt("$.price", self.max_price);

        match self.in_stock {
            Some(true) => filter.gt("$.stock", 0i64),
            Some(false) => filter.lte_opt("$.stock", Some(0i64)),
            None => filter,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.list(&ProductQuery { search: Some("kibble".into()), ..Default::default() },
///                      PageRequest::default()).await?;
/// let product = repo.get("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    pub async fn create(&self, product: &Product) -> DbResult<()> {
        info!(product_id = %product.id, shop = %product.shop, "Creating product");
        document::insert(&self.pool, product).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Product> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Product>> {
        document::get(&self.pool, id).await
    }

    /// Writes descriptive changes.
    ///
    /// Stock is re-read inside the statement so a concurrent order or
    /// adjustment is never overwritten by a stale copy.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        document::replace_keeping(&self.pool, product, &["$.stock"]).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(product_id = %id, "Deleting product");
        document::delete::<Product>(&self.pool, id).await
    }

    pub async fn list(&self, query: &ProductQuery, page: PageRequest) -> DbResult<Page<Product>> {
        document::find(&self.pool, &query.filter(), query.sort.to_sort(), page).await
    }

    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        document::get_many(&self.pool, ids).await
    }

    /// Overwrites stock with `max(0, stock)` and returns the product.
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<Product> {
        unit_of_work::set_stock(&self.pool, id, stock).await?;
        info!(product_id = %id, stock = stock.max(0), "Stock set directly");
        self.get(id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
