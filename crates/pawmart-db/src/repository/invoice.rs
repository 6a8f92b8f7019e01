//! # Invoice Repository
//!
//! Invoices issued by a shop. Numbering happens inside a
//! [`UnitOfWork`](crate::UnitOfWork) (see
//! [`next_invoice_number`](crate::UnitOfWork::next_invoice_number)).

use sqlx::SqlitePool;
use tracing::info;

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{Invoice, InvoiceStatus, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    /// `None` lists every shop's invoices (admins only).
    pub shop: Option<String>,
    pub status: Option<InvoiceStatus>,
}

impl InvoiceQuery {
    fn filter(&self) -> Filter {
        Filter::new()
            .eq_opt("$.shop", self.shop.clone())
            .eq_opt("$.status", self.status.map(|s| s.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Invoice> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Invoice>> {
        document::get(&self.pool, id).await
    }

    /// Stores a status change only if the stored invoice is still in `from`.
    pub async fn update_status(&self, invoice: &Invoice, from: InvoiceStatus) -> DbResult<bool> {
        info!(
            invoice = %invoice.invoice_number,
            from = %from,
            to = %invoice.status,
            "Updating invoice status"
        );
        document::replace_if(&self.pool, invoice, "$.status", from.as_str()).await
    }

    pub async fn list(&self, query: &InvoiceQuery, page: PageRequest) -> DbResult<Page<Invoice>> {
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
    use chrono::NaiveDate;
    use pawmart_core::types::{InvoiceCustomer, InvoiceItem};
    use pawmart_core::{Money, TaxRate};

    fn invoice(number: String) -> Invoice {
        Invoice::new(
            number,
            "shop-1",
            "seller-1",
            InvoiceCustomer {
                name: "Walk-in".to_string(),
                email: None,
                phone: None,
            },
            vec![InvoiceItem::new("p1", "Kibble", 1, Money::from_cents(1000))],
            TaxRate::from_bps(800),
            None,
        )
    }

    #[tokio::test]
    async fn test_daily_sequence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        let mut uow = db.begin().await.unwrap();
        let first = uow.next_invoice_number(day).await.unwrap();
        assert_eq!(first, "INV-20260314-0001");
        uow.insert(&invoice(first)).await.unwrap();

        let second = uow.next_invoice_number(day).await.unwrap();
        assert_eq!(second, "INV-20260314-0002");
        uow.insert(&invoice(second)).await.unwrap();

        assert_eq!(
            uow.next_invoice_number(other_day).await.unwrap(),
            "INV-20260315-0001"
        );
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut uow = db.begin().await.unwrap();
        uow.insert(&invoice("INV-20260314-0001".to_string()))
            .await
            .unwrap();
        assert!(uow
            .insert(&invoice("INV-20260314-0001".to_string()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_status_change_requires_stored_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stored = invoice("INV-20260314-0001".to_string());
        let mut uow = db.begin().await.unwrap();
        uow.insert(&stored).await.unwrap();
        uow.commit().await.unwrap();

        let mut paid = stored.clone();
        paid.status = InvoiceStatus::Paid;
        assert!(db.invoices().update_status(&paid, InvoiceStatus::Unpaid).await.unwrap());

        let mut cancelled = stored;
        cancelled.status = InvoiceStatus::Cancelled;
        assert!(!db
            .invoices()
            .update_status(&cancelled, InvoiceStatus::Unpaid)
            .await
            .unwrap());
        assert_eq!(
            db.invoices().get(&paid.id).await.unwrap().status,
            InvoiceStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut paid = invoice("INV-20260314-0001".to_string());
        paid.status = InvoiceStatus::Paid;
        let unpaid = invoice("INV-20260314-0002".to_string());

        let mut uow = db.begin().await.unwrap();
        uow.insert(&paid).await.unwrap();
        uow.insert(&unpaid).await.unwrap();
        uow.commit().await.unwrap();

        let query = InvoiceQuery {
            shop: Some("shop-1".to_string()),
            status: Some(InvoiceStatus::Unpaid),
        };
        let page = db.invoices().list(&query, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].total, Money::from_cents(1080));
    }
}
