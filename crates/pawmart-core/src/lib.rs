//! # pawmart-core: Pure Business Logic for PawMart
//!
//! This crate is the **heart** of PawMart. It contains the domain types,
//! workflow state machines and authorization policy as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PawMart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /api/pets  /api/adoptions  /api/rescues  /api/orders ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pawmart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ workflow  │  │  policy   │  │ validation│  │   │
//! │  │   │ Pet, User │  │ adoption  │  │ authorize │  │   rules   │  │   │
//! │  │   │ Rescue... │  │ rescue... │  │           │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pawmart-db (Database Layer)                    │   │
//! │  │        SQLite documents, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Pet, Adoption, Rescue, Shop, ...)
//! - [`workflow`] - Status transition tables per entity
//! - [`policy`] - Role and ownership rules
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use pawmart_core::types::AdoptionStatus;
//! use pawmart_core::workflow::adoption;
//!
//! let approve = adoption::next_state(AdoptionStatus::Pending, AdoptionStatus::Approved);
//! assert!(approve.is_ok());
//!
//! let reopen = adoption::next_state(AdoptionStatus::Rejected, AdoptionStatus::Pending);
//! assert!(reopen.is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;
pub mod workflow;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pawmart_core::Money` instead of
// `use pawmart_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum lines in one order or invoice.
pub const MAX_ORDER_LINES: usize = 100;

/// Largest single price, fee, funding goal or donation, in cents
/// (one billion in major units).
///
/// With [`MAX_ORDER_LINES`] and [`MAX_ITEM_QUANTITY`] this keeps every
/// order, cart and invoice total far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Maximum quantity of a single cart or order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest order or invoice subtotal the limits above can produce.
pub const MAX_TOTAL_CENTS: i64 = MAX_AMOUNT_CENTS * MAX_ITEM_QUANTITY * MAX_ORDER_LINES as i64;

/// Minimum password length accepted at registration and profile update.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Page size used when a listing request does not give `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest `limit` a listing request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;
