//! # Document Storage
//!
//! Every PawMart entity is stored as one JSON document in a table named
//! after its collection.
//!
//! ## Row Layout
//! ```text
//! ┌──────────────────────┬──────────────────┬──────────────────────────────┐
//! │ id (TEXT PK)         │ created_at (INT) │ doc (TEXT, JSON)             │
//! ├──────────────────────┼──────────────────┼──────────────────────────────┤
//! │ 9b2c…-…-…            │ 1767225600000000 │ {"id":"9b2c…","name":"Miso", │
//! │                      │ (µs since epoch) │  "status":"available", …}    │
//! └──────────────────────┴──────────────────┴──────────────────────────────┘
//! ```
//!
//! `created_at` is duplicated out of the document so listings can order
//! by it without parsing JSON.
//!
//! The generic helpers below accept any [`SqliteExecutor`], so they run
//! the same against the pool or inside a [`UnitOfWork`](crate::UnitOfWork).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::error::{DbError, DbResult};
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{
    Adoption, Employee, InventoryAdjustment, Invoice, Order, PageRequest, Pet, Product, Rescue,
    Shop, User,
};

// =============================================================================
// Document Trait
// =============================================================================

/// An entity that lives in its own collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin {
    /// Table name.
    const COLLECTION: &'static str;

    /// Entity name used in NotFound errors.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! document {
    ($ty:ty, $collection:literal, $entity:literal) => {
        impl Document for $ty {
            const COLLECTION: &'static str = $collection;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }
    };
}

document!(User, "users", "User");
document!(Pet, "pets", "Pet");
document!(Adoption, "adoptions", "Adoption");
document!(Rescue, "rescues", "Rescue");
document!(Shop, "shops", "Shop");
document!(Product, "products", "Product");
document!(Employee, "employees", "Employee");
document!(Order, "orders", "Order");
document!(InventoryAdjustment, "inventory_adjustments", "Inventory adjustment");
document!(Invoice, "invoices", "Invoice");

// =============================================================================
// Encoding
// =============================================================================

pub(crate) fn encode<D: Document>(doc: &D) -> DbResult<String> {
    Ok(serde_json::to_string(doc)?)
}

pub(crate) fn decode<D: Document>(raw: &str) -> DbResult<D> {
    serde_json::from_str(raw).map_err(|e| {
        DbError::Serialization(format!("{} document: {}", D::ENTITY, e))
    })
}

// =============================================================================
// CRUD Helpers
// =============================================================================

/// Inserts a new document.
pub(crate) async fn insert<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    doc: &D,
) -> DbResult<()> {
    let sql = format!(
        "INSERT INTO {} (id, created_at, doc) VALUES (?1, ?2, ?3)",
        D::COLLECTION
    );

    sqlx::query(&sql)
        .bind(doc.id())
        .bind(doc.created_at().timestamp_micros())
        .bind(encode(doc)?)
        .execute(exec)
        .await?;

    Ok(())
}

/// Loads a document by id.
pub(crate) async fn get<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    id: &str,
) -> DbResult<Option<D>> {
    let sql = format!("SELECT doc FROM {} WHERE id = ?1", D::COLLECTION);

    let raw: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;

    raw.as_deref().map(decode).transpose()
}

/// Loads a document by id, failing with NotFound.
pub(crate) async fn fetch<'e, D: Document>(exec: impl SqliteExecutor<'e>, id: &str) -> DbResult<D> {
    get(exec, id)
        .await?
        .ok_or_else(|| DbError::not_found(D::ENTITY, id))
}

/// Overwrites an existing document.
pub(crate) async fn replace<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    doc: &D,
) -> DbResult<()> {
    let sql = format!("UPDATE {} SET doc = ?2 WHERE id = ?1", D::COLLECTION);

    let result = sqlx::query(&sql)
        .bind(doc.id())
        .bind(encode(doc)?)
        .execute(exec)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(D::ENTITY, doc.id()));
    }

    Ok(())
}

/// Overwrites a document but carries the stored values at `kept` forward.
///
/// Fields owned by a workflow or by a single-statement writer are listed
/// in `kept`, so a stale in-memory copy can never roll them back.
pub(crate) async fn replace_keeping<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    doc: &D,
    kept: &[&str],
) -> DbResult<()> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "UPDATE {} SET doc = json_set(json(",
        D::COLLECTION
    ));
    qb.push_bind(encode(doc)?).push(")");
    for path in kept {
        qb.push(", ")
            .push_bind(*path)
            .push(", doc -> ")
            .push_bind(*path);
    }
    qb.push(") WHERE id = ").push_bind(doc.id());

    let result = qb.build().execute(exec).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found(D::ENTITY, doc.id()));
    }

    Ok(())
}

/// Overwrites a document only while the scalar at `path` still equals
/// `expected`. Returns `false` when another writer moved it first.
pub(crate) async fn replace_if<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    doc: &D,
    path: &str,
    expected: &str,
) -> DbResult<bool> {
    let sql = format!(
        "UPDATE {} SET doc = ?2 WHERE id = ?1 AND json_extract(doc, ?3) = ?4",
        D::COLLECTION
    );

    let result = sqlx::query(&sql)
        .bind(doc.id())
        .bind(encode(doc)?)
        .bind(path)
        .bind(expected)
        .execute(exec)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Writes one field and stamps `updatedAt`, leaving the rest of the
/// stored document untouched.
pub(crate) async fn set_field<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    id: &str,
    path: &str,
    value: &impl Serialize,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE {} SET doc = json_set(doc, ?2, json(?3), '$.updatedAt', ?4) WHERE id = ?1",
        D::COLLECTION
    );

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(path)
        .bind(serde_json::to_string(value)?)
        .bind(crate::unit_of_work::now_rfc3339())
        .execute(exec)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(D::ENTITY, id));
    }

    Ok(())
}

/// Deletes a document. Returns `false` if it did not exist.
pub(crate) async fn delete<'e, D: Document>(exec: impl SqliteExecutor<'e>, id: &str) -> DbResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", D::COLLECTION);

    let result = sqlx::query(&sql).bind(id).execute(exec).await?;

    Ok(result.rows_affected() > 0)
}

/// Counts documents matching a filter.
pub(crate) async fn count<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    filter: &Filter,
) -> DbResult<u64> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", D::COLLECTION));
    filter.push_where(&mut qb);

    let total: i64 = qb.build_query_scalar().fetch_one(exec).await?;
    Ok(total as u64)
}

/// Runs a filtered, sorted, paginated listing.
pub(crate) async fn find<D: Document>(
    pool: &SqlitePool,
    filter: &Filter,
    sort: Sort,
    page: PageRequest,
) -> DbResult<Page<D>> {
    let total = count::<D>(pool, filter).await?;

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT doc FROM {}", D::COLLECTION));
    filter.push_where(&mut qb);
    sort.push_order_by(&mut qb);
    qb.push(" LIMIT ")
        .push_bind(page.limit() as i64)
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);

    let rows: Vec<String> = qb.build_query_scalar().fetch_all(pool).await?;
    let items = rows
        .iter()
        .map(|raw| decode(raw))
        .collect::<DbResult<Vec<D>>>()?;

    Ok(Page {
        items,
        pagination: page.pagination(total),
    })
}

/// Returns every document matching a filter, newest first, without
/// pagination.
pub(crate) async fn find_all<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    filter: &Filter,
) -> DbResult<Vec<D>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT doc FROM {}", D::COLLECTION));
    filter.push_where(&mut qb);
    Sort::Newest.push_order_by(&mut qb);

    let rows: Vec<String> = qb.build_query_scalar().fetch_all(exec).await?;
    rows.iter().map(|raw| decode(raw)).collect()
}

/// Loads several documents by id, in no particular order. Missing ids are
/// skipped.
pub(crate) async fn get_many<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    ids: &[String],
) -> DbResult<Vec<D>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT doc FROM {} WHERE id IN (", D::COLLECTION));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");

    let rows: Vec<String> = qb.build_query_scalar().fetch_all(exec).await?;
    rows.iter().map(|raw| decode(raw)).collect()
}

/// Appends `value` to the array at `path` and stamps `updatedAt`, in one
/// statement.
pub(crate) async fn append<'e, D: Document>(
    exec: impl SqliteExecutor<'e>,
    id: &str,
    path: &'static str,
    value: &impl Serialize,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE {} SET doc = json_set(json_insert(doc, '{}[#]', json(?2)), '$.updatedAt', ?3) \
         WHERE id = ?1",
        D::COLLECTION,
        path
    );

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(serde_json::to_string(value)?)
        .bind(crate::unit_of_work::now_rfc3339())
        .execute(exec)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(D::ENTITY, id));
    }

    Ok(())
}
