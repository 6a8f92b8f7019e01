//! User accounts: role, profile, favorites and the embedded cart.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Address;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_cart_size, validate_quantity};

// =============================================================================
// Role
// =============================================================================

/// The role a user holds. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
    Ngo,
    Employee,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
            Role::Ngo => "ngo",
            Role::Employee => "employee",
        }
    }

    /// Sellers and NGOs list pets (and sellers list products).
    pub const fn is_provider(&self) -> bool {
        matches!(self, Role::Seller | Role::Ngo)
    }

    /// Roles a visitor may pick when registering. Admins are provisioned
    /// out of band and employees are created by their seller.
    pub const fn is_self_registrable(&self) -> bool {
        matches!(self, Role::Buyer | Role::Seller | Role::Ngo)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Buyer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            "ngo" => Ok(Role::Ngo),
            "employee" => Ok(Role::Employee),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: ["buyer", "seller", "admin", "ngo", "employee"]
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Favorites
// =============================================================================

/// Favorite pets and products. Both lists behave as ordered sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Favorites {
    #[serde(default)]
    pub pets: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
}

impl Favorites {
    /// Returns `false` when the pet was already a favorite.
    pub fn add_pet(&mut self, pet_id: &str) -> bool {
        add_unique(&mut self.pets, pet_id)
    }

    pub fn remove_pet(&mut self, pet_id: &str) -> bool {
        remove_value(&mut self.pets, pet_id)
    }

    /// Returns `false` when the product was already a favorite.
    pub fn add_product(&mut self, product_id: &str) -> bool {
        add_unique(&mut self.products, product_id)
    }

    pub fn remove_product(&mut self, product_id: &str) -> bool {
        remove_value(&mut self.products, product_id)
    }
}

fn add_unique(list: &mut Vec<String>, id: &str) -> bool {
    if list.iter().any(|existing| existing == id) {
        return false;
    }
    list.push(id.to_string());
    true
}

fn remove_value(list: &mut Vec<String>, id: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != id);
    list.len() != before
}

// =============================================================================
// Cart
// =============================================================================

/// One product line in a cart.
///
/// The name and unit price are snapshotted when the line is first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl CartItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A user's shopping cart.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  add_item(product, qty)                                                 │
/// │       │                                                                 │
/// │       ├── product already in cart? ──► quantity += qty                  │
/// │       │                                (result must stay ≤ 999)         │
/// │       │                                                                 │
/// │       └── new line ──► cart must hold < 100 lines                       │
/// │                                                                         │
/// │  set_quantity(product, 0) removes the line                              │
/// │  total() is always derived, never stored                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Adds a product or merges into its existing line.
    pub fn add_item(
        &mut self,
        product_id: &str,
        name: &str,
        unit_price: Money,
        quantity: i64,
    ) -> Result<(), ValidationError> {
        validate_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product == product_id) {
            let merged = item.quantity + quantity;
            validate_quantity(merged)?;
            item.quantity = merged;
            return Ok(());
        }

        validate_cart_size(self.items.len())?;
        self.items.push(CartItem {
            product: product_id.to_string(),
            name: name.to_string(),
            quantity,
            unit_price,
        });
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return if self.remove_item(product_id) {
                Ok(())
            } else {
                Err(CoreError::not_found("Cart item", product_id))
            };
        }

        validate_quantity(quantity)?;
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product == product_id)
            .ok_or_else(|| CoreError::not_found("Cart item", product_id))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Removes a line. Returns `false` if the product was not in the cart.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ unitPrice × quantity.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart as returned to clients, with the derived total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            items: cart.items.clone(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A stored user account, including the password hash.
///
/// Never serialise a `User` to an HTTP client. Convert it to a
/// [`UserProfile`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Lowercased on registration; unique.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default)]
    pub favorites: Favorites,
    #[serde(default)]
    pub cart: Cart,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh account. The email is normalised to lowercase.
    pub fn new(name: &str, email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            role,
            phone: None,
            address: None,
            avatar: None,
            organization: None,
            favorites: Favorites::default(),
            cart: Cart::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Lowercases and trims an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The client-facing view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub favorites: Favorites,
    pub cart: CartView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            address: user.address.clone(),
            avatar: user.avatar.clone(),
            organization: user.organization.clone(),
            favorites: user.favorites.clone(),
            cart: CartView::from(&user.cart),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile fields a user may change on their own account.
///
/// `role` and `email` cannot be changed; unknown JSON keys are ignored.
/// Password changes go through the API layer, which owns hashing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub avatar: Option<String>,
    pub organization: Option<String>,
}

impl ProfilePatch {
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(organization) = self.organization {
            user.organization = Some(organization);
        }
        user.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Ana", "  Ana@Example.COM ", "hash".to_string(), Role::Buyer)
    }

    #[test]
    fn test_new_user_normalizes_email() {
        let u = user();
        assert_eq!(u.email, "ana@example.com");
        assert!(u.cart.is_empty());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_value(Role::Ngo).unwrap(), "ngo");
        assert_eq!("seller".parse::<Role>().unwrap(), Role::Seller);
        assert!("owner".parse::<Role>().is_err());
        assert!(!Role::Admin.is_self_registrable());
        assert!(!Role::Employee.is_self_registrable());
        assert!(Role::Ngo.is_provider());
    }

    #[test]
    fn test_favorites_are_sets() {
        let mut fav = Favorites::default();
        assert!(fav.add_pet("p1"));
        assert!(!fav.add_pet("p1"));
        assert_eq!(fav.pets.len(), 1);
        assert!(fav.remove_pet("p1"));
        assert!(!fav.remove_pet("p1"));
    }

    #[test]
    fn test_cart_merges_lines_and_derives_total() {
        let mut cart = Cart::default();
        cart.add_item("kibble", "Kibble 5kg", Money::from_cents(2499), 1)
            .unwrap();
        cart.add_item("kibble", "Kibble 5kg", Money::from_cents(2499), 2)
            .unwrap();
        cart.add_item("ball", "Tennis Ball", Money::from_cents(350), 4)
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total().cents(), 2499 * 3 + 350 * 4);
    }

    #[test]
    fn test_cart_quantity_limits() {
        let mut cart = Cart::default();
        assert!(cart.add_item("a", "A", Money::from_cents(100), 0).is_err());
        cart.add_item("a", "A", Money::from_cents(100), 998).unwrap();
        assert!(cart.add_item("a", "A", Money::from_cents(100), 2).is_err());
        assert_eq!(cart.items[0].quantity, 998);
    }

    #[test]
    fn test_cart_max_lines() {
        let mut cart = Cart::default();
        for i in 0..crate::MAX_CART_ITEMS {
            cart.add_item(&format!("p{i}"), "x", Money::from_cents(1), 1)
                .unwrap();
        }
        assert!(cart.add_item("one-more", "x", Money::from_cents(1), 1).is_err());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::default();
        cart.add_item("a", "A", Money::from_cents(100), 2).unwrap();
        cart.set_quantity("a", 5).unwrap();
        assert_eq!(cart.items[0].quantity, 5);
        cart.set_quantity("a", 0).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.set_quantity("a", 1),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let json = serde_json::to_value(user().profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["cart"]["total"], 0);
        assert_eq!(json["role"], "buyer");
    }

    #[test]
    fn test_profile_patch_ignores_role() {
        let mut u = user();
        let patch: ProfilePatch =
            serde_json::from_value(serde_json::json!({ "name": "Bea", "role": "admin" }))
                .unwrap();
        patch.apply_to(&mut u);
        assert_eq!(u.name, "Bea");
        assert_eq!(u.role, Role::Buyer);
    }
}
