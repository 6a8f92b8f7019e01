//! # Employee Repository
//!
//! Shop staff records. Hiring creates the employee's user account and the
//! employment record together, so it runs through a
//! [`UnitOfWork`](crate::UnitOfWork); everything else is here.

use sqlx::SqlitePool;

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{Employee, PageRequest};

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Employee> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Employee>> {
        document::get(&self.pool, id).await
    }

    /// The employment record of a user, active or not.
    pub async fn find_by_user(&self, user: &str) -> DbResult<Option<Employee>> {
        let raw: Option<String> = sqlx::query_scalar(
            "SELECT doc FROM employees WHERE json_extract(doc, '$.user') = ?1",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        raw.as_deref().map(document::decode).transpose()
    }

    pub async fn update(&self, employee: &Employee) -> DbResult<()> {
        document::replace(&self.pool, employee).await
    }

    /// Lists a shop's staff, newest first.
    pub async fn list_by_shop(&self, shop: &str, page: PageRequest) -> DbResult<Page<Employee>> {
        let filter = Filter::new().eq("$.shop", shop);
        document::find(&self.pool, &filter, Sort::Newest, page).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use pawmart_core::types::Permissions;

    #[tokio::test]
    async fn test_one_employment_per_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = Employee::new("user-1", "shop-1", "Cashier", Permissions::none());
        let second = Employee::new("user-1", "shop-2", "Stocker", Permissions::none());

        let mut uow = db.begin().await.unwrap();
        uow.insert(&first).await.unwrap();
        let err = uow.insert(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        uow.commit().await.unwrap();

        let found = db.employees().find_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(found.shop, "shop-1");
    }

    #[tokio::test]
    async fn test_list_by_shop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut uow = db.begin().await.unwrap();
        for (user, shop) in [("u1", "shop-1"), ("u2", "shop-1"), ("u3", "shop-2")] {
            uow.insert(&Employee::new(user, shop, "Clerk", Permissions::none()))
                .await
                .unwrap();
        }
        uow.commit().await.unwrap();

        let page = db
            .employees()
            .list_by_shop("shop-1", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
    }
}
