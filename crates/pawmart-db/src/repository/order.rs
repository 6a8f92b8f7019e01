//! # Order Repository
//!
//! Orders are created inside a [`UnitOfWork`](crate::UnitOfWork) together
//! with their stock decrements; this repository reads them back and
//! records status changes.

use sqlx::SqlitePool;
use tracing::info;

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{Order, OrderStatus, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub buyer: Option<String>,
    pub shop: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderQuery {
    fn filter(&self) -> Filter {
        Filter::new()
            .eq_opt("$.buyer", self.buyer.clone())
            .eq_opt("$.shop", self.shop.clone())
            .eq_opt("$.status", self.status.map(|s| s.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Order> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Order>> {
        document::get(&self.pool, id).await
    }

    /// Stores a status change only if the stored order is still in `from`.
    ///
    /// Returns `false` when a concurrent change got there first.
    pub async fn update_status(&self, order: &Order, from: OrderStatus) -> DbResult<bool> {
        info!(order_id = %order.id, from = %from, to = %order.status, "Updating order status");
        document::replace_if(&self.pool, order, "$.status", from.as_str()).await
    }

    /// Lists orders, newest first.
    pub async fn list(&self, query: &OrderQuery, page: PageRequest) -> DbResult<Page<Order>> {
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
    use pawmart_core::types::OrderItem;
    use pawmart_core::Money;

    fn order(buyer: &str, shop: &str) -> Order {
        Order::new(
            buyer,
            shop,
            vec![OrderItem {
                product: "p1".to_string(),
                name: "Kibble".to_string(),
                quantity: 2,
                unit_price: Money::from_cents(1000),
            }],
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_list_by_buyer_and_shop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut uow = db.begin().await.unwrap();
        for o in [order("b1", "s1"), order("b1", "s2"), order("b2", "s1")] {
            uow.insert(&o).await.unwrap();
        }
        uow.commit().await.unwrap();

        let mine = OrderQuery {
            buyer: Some("b1".to_string()),
            ..Default::default()
        };
        let page = db.orders().list(&mine, PageRequest::default()).await.unwrap();
        assert_eq!(page.pagination.total, 2);

        let shop = OrderQuery {
            shop: Some("s1".to_string()),
            status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        let page = db.orders().list(&shop, PageRequest::default()).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.items[0].total, Money::from_cents(2000));
    }

    #[tokio::test]
    async fn test_status_update_from_stale_copy_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let o = order("b1", "s1");
        let mut uow = db.begin().await.unwrap();
        uow.insert(&o).await.unwrap();
        uow.commit().await.unwrap();

        let mut cancelled = db.orders().get(&o.id).await.unwrap();
        let mut completed = cancelled.clone();

        cancelled.status = OrderStatus::Cancelled;
        assert!(db
            .orders()
            .update_status(&cancelled, OrderStatus::Pending)
            .await
            .unwrap());

        completed.status = OrderStatus::Completed;
        assert!(!db
            .orders()
            .update_status(&completed, OrderStatus::Pending)
            .await
            .unwrap());

        let stored = db.orders().get(&o.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
    }
}
