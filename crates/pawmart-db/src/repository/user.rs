//! # User Repository
//!
//! Accounts, profiles, favorites and carts. Favorites and the cart live
//! inside the user document but are written on their own: `update` leaves
//! them as stored, and [`update_cart`](UserRepository::update_cart) /
//! [`update_favorites`](UserRepository::update_favorites) read and write
//! them inside one transaction.
//!
//! Emails are stored lowercase and guarded by the `users_email_unique`
//! expression index.

use sqlx::SqlitePool;
use tracing::debug;

use crate::document;
use crate::error::{DbError, DbResult};
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{normalize_email, Cart, Favorites, PageRequest, Role, User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// ## Errors
    /// - `UniqueViolation` on `email` when the address is taken
    pub async fn create(&self, user: &User) -> DbResult<()> {
        debug!(user_id = %user.id, role = %user.role, "Creating user");

        document::insert(&self.pool, user)
            .await
            .map_err(|e| duplicate_email(e, &user.email))
    }

    pub async fn get(&self, id: &str) -> DbResult<User> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<User>> {
        document::get(&self.pool, id).await
    }

    /// Looks a user up by email, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let raw: Option<String> = sqlx::query_scalar(
            "SELECT doc FROM users WHERE json_extract(doc, '$.email') = ?1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        raw.as_deref().map(document::decode).transpose()
    }

    /// Writes profile changes. The stored cart and favorites are kept.
    pub async fn update(&self, user: &User) -> DbResult<()> {
        document::replace_keeping(&self.pool, user, &["$.cart", "$.favorites"])
            .await
            .map_err(|e| duplicate_email(e, &user.email))
    }

    /// Applies `change` to the stored cart and writes it back.
    ///
    /// Nothing is written when `change` fails.
    pub async fn update_cart<E>(
        &self,
        id: &str,
        change: impl FnOnce(&mut Cart) -> Result<(), E>,
    ) -> Result<Cart, E>
    where
        E: From<DbError>,
    {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let mut user: User = document::fetch(&mut *tx, id).await?;
        change(&mut user.cart)?;
        document::set_field::<User>(&mut *tx, id, "$.cart", &user.cart).await?;
        tx.commit().await.map_err(DbError::from)?;

        debug!(user_id = %id, lines = user.cart.items.len(), "Cart updated");
        Ok(user.cart)
    }

    /// Applies `change` to the stored favorites and writes them back when
    /// it reports a change.
    pub async fn update_favorites(
        &self,
        id: &str,
        change: impl FnOnce(&mut Favorites) -> bool,
    ) -> DbResult<Favorites> {
        let mut tx = self.pool.begin().await?;
        let mut user: User = document::fetch(&mut *tx, id).await?;
        if change(&mut user.favorites) {
            document::set_field::<User>(&mut *tx, id, "$.favorites", &user.favorites).await?;
        }
        tx.commit().await?;

        Ok(user.favorites)
    }

    /// Lists users, newest first, optionally restricted to one role.
    pub async fn list(&self, role: Option<Role>, page: PageRequest) -> DbResult<Page<User>> {
        let filter = Filter::new().eq_opt("$.role", role.map(|r| r.as_str()));
        document::find(&self.pool, &filter, Sort::Newest, page).await
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        Ok(self.find(id).await?.is_some())
    }
}

/// Rewrites an email index violation with the offending address.
pub(crate) fn duplicate_email(err: DbError, email: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let db = setup().await;
        let user = User::new("Ana", "Ana@Example.com", "hash".to_string(), Role::Buyer);
        db.users().create(&user).await.unwrap();

        let found = db
            .users()
            .find_by_email("ANA@example.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = setup().await;
        let first = User::new("Ana", "ana@example.com", "h".to_string(), Role::Buyer);
        let second = User::new("Ana 2", "ANA@example.com", "h".to_string(), Role::Seller);

        db.users().create(&first).await.unwrap();
        let err = db.users().create(&second).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_list_by_role() {
        let db = setup().await;
        for (i, role) in [Role::Buyer, Role::Seller, Role::Buyer].into_iter().enumerate() {
            let user = User::new("U", &format!("u{i}@example.com"), "h".to_string(), role);
            db.users().create(&user).await.unwrap();
        }

        let buyers = db
            .users()
            .list(Some(Role::Buyer), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(buyers.pagination.total, 2);
        assert!(buyers.items.iter().all(|u| u.role == Role::Buyer));

        let all = db.users().list(None, PageRequest::default()).await.unwrap();
        assert_eq!(all.items.len(), 3);
    }

    #[tokio::test]
    async fn test_cart_and_favorites_are_written_in_place() {
        let db = setup().await;
        let user = User::new("Ana", "ana@example.com", "h".to_string(), Role::Buyer);
        db.users().create(&user).await.unwrap();

        let cart = db
            .users()
            .update_cart(&user.id, |cart| {
                cart.add_item("p1", "Kibble", pawmart_core::Money::from_cents(1500), 2)
                    .unwrap();
                Ok::<_, DbError>(())
            })
            .await
            .unwrap();
        assert_eq!(cart.total().cents(), 3000);

        db.users()
            .update_favorites(&user.id, |f| f.add_pet("pet-1"))
            .await
            .unwrap();

        let stored = db.users().get(&user.id).await.unwrap();
        assert_eq!(stored.cart.items.len(), 1);
        assert_eq!(stored.favorites.pets, vec!["pet-1".to_string()]);
    }

    #[tokio::test]
    async fn test_profile_update_keeps_newer_cart() {
        let db = setup().await;
        let mut user = User::new("Ana", "ana@example.com", "h".to_string(), Role::Buyer);
        db.users().create(&user).await.unwrap();

        db.users()
            .update_cart(&user.id, |cart| {
                cart.add_item("p1", "Kibble", pawmart_core::Money::from_cents(1500), 1)
                    .unwrap();
                Ok::<_, DbError>(())
            })
            .await
            .unwrap();

        // `user` still holds the empty cart it was created with.
        user.name = "Ana Maria".to_string();
        db.users().update(&user).await.unwrap();

        let stored = db.users().get(&user.id).await.unwrap();
        assert_eq!(stored.name, "Ana Maria");
        assert_eq!(stored.cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_cart_change_writes_nothing() {
        let db = setup().await;
        let user = User::new("Ana", "ana@example.com", "h".to_string(), Role::Buyer);
        db.users().create(&user).await.unwrap();

        let result = db
            .users()
            .update_cart(&user.id, |_| Err(DbError::not_found("Cart item", "p9")))
            .await;
        assert!(result.is_err());
        assert!(db.users().get(&user.id).await.unwrap().cart.is_empty());
    }
}
