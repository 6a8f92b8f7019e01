//! # Domain Types
//!
//! Core domain types used throughout PawMart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Accounts            Listings            Workflows                      │
//! │  ─────────────       ─────────────       ─────────────────────          │
//! │  User                Pet                 Adoption  (pet ↔ applicant)    │
//! │  ├── Role            Shop                Rescue    (ngo operation)      │
//! │  ├── Favorites       Product             Order     (buyer ↔ shop)       │
//! │  └── Cart            Employee            InventoryAdjustment            │
//! │                                          Invoice   (shop → customer)    │
//! │                                                                         │
//! │  Shared: Address, Location, Pagination, PageRequest                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has an `id` that is a UUID v4 string. References between
//! entities (`pet.provider`, `order.shop`, ...) hold the referenced id.
//!
//! ## Wire Format
//! All structs serialise with camelCase field names. The same JSON shape
//! is stored in the database and returned to HTTP clients, except for
//! [`User`] which is converted to a [`UserProfile`] first.

mod adoption;
mod common;
mod employee;
mod inventory;
mod invoice;
mod order;
mod pet;
mod product;
mod rescue;
mod shop;
mod user;

pub use adoption::*;
pub use common::*;
pub use employee::*;
pub use inventory::*;
pub use invoice::*;
pub use order::*;
pub use pet::*;
pub use product::*;
pub use rescue::*;
pub use shop::*;
pub use user::*;
