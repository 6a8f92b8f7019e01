//! # Unit of Work
//!
//! One SQLite transaction wrapping a compound mutation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut uow = db.begin().await?;          BEGIN                        │
//! │                                                                         │
//! │  let pet: Pet = uow.fetch(&pet_id).await?; ─┐                           │
//! │  adoption::check_can_apply(...)?;           │ any `?` drops `uow`       │
//! │  uow.insert(&adoption).await?;              │ → ROLLBACK                │
//! │  uow.replace(&pet).await?;                 ─┘                           │
//! │                                                                         │
//! │  uow.commit().await?;                      COMMIT                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything inside a unit of work must go through its own connection.
//! The in-memory test database has a single pooled connection, so reaching
//! for the pool while a unit of work is open would wait forever.

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::document::{self, Document};
use crate::error::{DbError, DbResult};
use crate::filter::Filter;
use pawmart_core::types::{invoice_number, Adoption, AdoptionStatus, Product};

/// An open transaction. Dropping it without [`commit`](Self::commit) rolls
/// back every write made through it.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(UnitOfWork { tx })
    }

    pub async fn get<D: Document>(&mut self, id: &str) -> DbResult<Option<D>> {
        document::get(&mut *self.tx, id).await
    }

    pub async fn fetch<D: Document>(&mut self, id: &str) -> DbResult<D> {
        document::fetch(&mut *self.tx, id).await
    }

    pub async fn insert<D: Document>(&mut self, doc: &D) -> DbResult<()> {
        document::insert(&mut *self.tx, doc).await
    }

    pub async fn replace<D: Document>(&mut self, doc: &D) -> DbResult<()> {
        document::replace(&mut *self.tx, doc).await
    }

    /// Overwrites `doc` only while its stored `$.status` is still `from`.
    pub async fn replace_if_status<D: Document>(&mut self, doc: &D, from: &str) -> DbResult<bool> {
        document::replace_if(&mut *self.tx, doc, "$.status", from).await
    }

    pub async fn set_field<D: Document>(
        &mut self,
        id: &str,
        path: &str,
        value: &impl serde::Serialize,
    ) -> DbResult<()> {
        document::set_field::<D>(&mut *self.tx, id, path, value).await
    }

    pub async fn delete<D: Document>(&mut self, id: &str) -> DbResult<bool> {
        document::delete::<D>(&mut *self.tx, id).await
    }

    pub async fn find_all<D: Document>(&mut self, filter: &Filter) -> DbResult<Vec<D>> {
        document::find_all(&mut *self.tx, filter).await
    }

    /// Whether `applicant` has a pending or approved application for `pet`.
    pub async fn has_active_adoption(&mut self, pet: &str, applicant: &str) -> DbResult<bool> {
        let count = document::count::<Adoption>(
            &mut *self.tx,
            &active_adoptions(pet).eq("$.applicant", applicant),
        )
        .await?;

        Ok(count > 0)
    }

    /// Number of pending or approved applications referencing `pet`.
    pub async fn count_active_adoptions(&mut self, pet: &str) -> DbResult<u64> {
        document::count::<Adoption>(&mut *self.tx, &active_adoptions(pet)).await
    }

    /// Decrements a product's stock only if at least `quantity` is on hand.
    ///
    /// Returns `false` (and changes nothing) when stock is insufficient.
    pub async fn decrement_stock(&mut self, product: &str, quantity: i64) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET doc = json_set(doc,
                '$.stock', json_extract(doc, '$.stock') - ?2,
                '$.updatedAt', ?3)
            WHERE id = ?1 AND json_extract(doc, '$.stock') >= ?2
            "#,
        )
        .bind(product)
        .bind(quantity)
        .bind(now_rfc3339())
        .execute(&mut *self.tx)
        .await?;

        debug!(
            product_id = %product,
            quantity,
            applied = result.rows_affected() > 0,
            "Conditional stock decrement"
        );

        Ok(result.rows_affected() > 0)
    }

    /// Overwrites a product's stock level.
    pub async fn set_stock(&mut self, product: &str, stock: i64) -> DbResult<Product> {
        set_stock(&mut *self.tx, product, stock).await?;
        self.fetch(product).await
    }

    /// Next free `INV-YYYYMMDD-NNNN` number for `date`.
    ///
    /// The `invoices_number_unique` index rejects the insert if another
    /// transaction claimed the same number first.
    pub async fn next_invoice_number(&mut self, date: NaiveDate) -> DbResult<String> {
        let prefix = invoice_number(date, 0);
        let prefix = &prefix[..prefix.len() - 4];

        let last: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(substr(json_extract(doc, '$.invoiceNumber'), ?2) AS INTEGER))
            FROM invoices
            WHERE json_extract(doc, '$.invoiceNumber') LIKE ?1
            "#,
        )
        .bind(format!("{prefix}%"))
        .bind(prefix.len() as i64 + 1)
        .fetch_one(&mut *self.tx)
        .await?;

        let next = last.unwrap_or(0) + 1;
        Ok(invoice_number(date, next as u32))
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

fn active_adoptions(pet: &str) -> Filter {
    Filter::new().eq("$.pet", pet).one_of(
        "$.status",
        vec![
            AdoptionStatus::Pending.as_str().into(),
            AdoptionStatus::Approved.as_str().into(),
        ],
    )
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Single-statement stock overwrite, clamped at zero.
pub(crate) async fn set_stock<'e>(
    exec: impl sqlx::SqliteExecutor<'e>,
    product: &str,
    stock: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET doc = json_set(doc, '$.stock', max(0, ?2), '$.updatedAt', ?3)
        WHERE id = ?1
        "#,
    )
    .bind(product)
    .bind(stock)
    .bind(now_rfc3339())
    .execute(exec)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
