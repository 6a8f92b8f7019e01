//! # pawmart-db: Database Layer for PawMart
//!
//! This crate provides database access for the PawMart marketplace.
//! It stores every entity as a JSON document in SQLite, using sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PawMart Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/adoptions)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pawmart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  users, pets, │    │  (embedded)  │  │   │
//! │  │   │               │    │  adoptions,   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  rescues, ... │    │ 001_init.sql │  │   │
//! │  │   │ UnitOfWork    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   document.rs: generic JSON document CRUD                       │   │
//! │  │   filter.rs:   WHERE / ORDER BY builder + pagination            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (pawmart.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded schema, applied on connect
//! - [`error`] - Database error types
//! - [`document`] - JSON document storage helpers
//! - [`filter`] - Listing filters, sorting and pages
//! - [`password`] - Argon2 password hashing
//! - [`unit_of_work`] - Transactions for compound mutations
//! - [`repository`] - One repository per collection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pawmart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./pawmart.db")).await?;
//!
//! let rescue = db.rescues().get(&id).await?;
//! let funding = db.rescues().add_donation(&id, &donation).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod filter;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use document::Document;
pub use error::{DbError, DbResult};
pub use filter::Page;
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::{
    AdjustmentQuery, AdjustmentRepository, AdoptionQuery, AdoptionRepository, EmployeeRepository,
    InvoiceQuery, InvoiceRepository, OrderQuery, OrderRepository, PetQuery, PetRepository,
    PetSort, ProductQuery, ProductRepository, ProductSort, RescueQuery, RescueRepository,
    ShopRepository, UserRepository,
};
