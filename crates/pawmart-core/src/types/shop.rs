//! Seller shops. A seller owns at most one shop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Address;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// User id of the owning seller.
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl NewShop {
    pub fn into_shop(self, owner: &str) -> Shop {
        let now = Utc::now();
        Shop {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            owner: owner.to_string(),
            address: self.address,
            phone: self.phone,
            email: self.email,
            logo: self.logo,
            categories: self.categories,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable shop fields. The owner cannot be reassigned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
    pub categories: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl ShopPatch {
    pub fn apply_to(self, shop: &mut Shop) {
        if let Some(name) = self.name {
            shop.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            shop.description = description;
        }
        if let Some(address) = self.address {
            shop.address = Some(address);
        }
        if let Some(phone) = self.phone {
            shop.phone = Some(phone);
        }
        if let Some(email) = self.email {
            shop.email = Some(email);
        }
        if let Some(logo) = self.logo {
            shop.logo = Some(logo);
        }
        if let Some(categories) = self.categories {
            shop.categories = categories;
        }
        if let Some(active) = self.is_active {
            shop.is_active = active;
        }
        shop.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_keeps_owner() {
        let new: NewShop = serde_json::from_value(json!({ "name": "Happy Tails" })).unwrap();
        let mut shop = new.into_shop("seller-1");
        assert!(shop.is_active);

        let patch: ShopPatch =
            serde_json::from_value(json!({ "owner": "seller-2", "isActive": false })).unwrap();
        patch.apply_to(&mut shop);

        assert_eq!(shop.owner, "seller-1");
        assert!(!shop.is_active);
    }
}
