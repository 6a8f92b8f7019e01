//! Shop products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pet::Species;
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Food,
    Toys,
    Accessories,
    Health,
    Grooming,
    Housing,
    Other,
}

impl ProductCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Food => "food",
            ProductCategory::Toys => "toys",
            ProductCategory::Accessories => "accessories",
            ProductCategory::Health => "health",
            ProductCategory::Grooming => "grooming",
            ProductCategory::Housing => "housing",
            ProductCategory::Other => "other",
        }
    }
}

impl Default for ProductCategory {
    fn default() -> Self {
        ProductCategory::Other
    }
}

/// A product sold by a shop.
///
/// ## Stock Writers
/// ```text
/// Order creation ─────────────┐
/// Inventory adjustment ───────┼──► Product.stock  (never below zero)
/// Direct stock endpoint ──────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub shop: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ProductCategory,
    pub price: Money,
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub pet_types: Vec<Species>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: ProductCategory,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub pet_types: Vec<Species>,
    pub brand: Option<String>,
    pub sku: Option<String>,
}

impl NewProduct {
    pub fn into_product(self, shop_id: &str) -> Product {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            shop: shop_id.to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            price: self.price,
            stock: self.stock.max(0),
            images: self.images,
            pet_types: self.pet_types,
            brand: self.brand,
            sku: self.sku,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable product fields. Stock moves only through orders, inventory
/// adjustments and the stock endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<Money>,
    pub images: Option<Vec<String>>,
    pub pet_types: Option<Vec<Species>>,
    pub brand: Option<String>,
    pub sku: Option<String>,
}

impl ProductPatch {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(pet_types) = self.pet_types {
            product.pet_types = pet_types;
        }
        if let Some(brand) = self.brand {
            product.brand = Some(brand);
        }
        if let Some(sku) = self.sku {
            product.sku = Some(sku);
        }
        product.updated_at = Utc::now();
    }
}
