//! # Schema
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary and
//! applied by [`Database::new`](crate::Database::new) before the pool is
//! handed out.
//!
//! ```text
//! 001_initial_schema.sql
//!   users  pets  adoptions  rescues  shops  products
//!   employees  orders  inventory_adjustments  invoices
//!     each: (id TEXT PK, created_at INTEGER, doc TEXT json_valid)
//!   unique: users.email, shops.owner, employees.user,
//!           invoices.invoiceNumber
//! ```
//!
//! Applied versions are tracked by sqlx in `_sqlx_migrations`. Schema
//! changes go in a new `NNN_description.sql`; a file that already shipped
//! is never edited, its checksum would stop matching.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded in `_sqlx_migrations`.
pub(crate) async fn run(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(
        migrations = MIGRATOR.migrations.len(),
        "Document collections ready"
    );
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
