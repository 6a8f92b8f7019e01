//! # Repository Module
//!
//! One repository per collection. Each holds a clone of the pool and
//! exposes the queries its collection needs.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.pets().list(&query, page)                                   │
//! │       ▼                                                                 │
//! │  PetRepository                                                          │
//! │  ├── create(&pet)                                                       │
//! │  ├── get(id) / find(id)                                                 │
//! │  ├── update(&pet)                                                       │
//! │  └── list(&query, page)                                                 │
//! │       │                                                                 │
//! │       │  document helpers + Filter/Sort                                 │
//! │       ▼                                                                 │
//! │  SQLite (one JSON document per row)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads and single-statement writes go through repositories. Writes that
//! must change two documents together go through
//! [`UnitOfWork`](crate::UnitOfWork) instead.
//!
//! ## Naming
//! - `get(id)` fails with NotFound when the document is missing
//! - `find(id)` returns `Option`

pub mod adoption;
pub mod employee;
pub mod inventory;
pub mod invoice;
pub mod order;
pub mod pet;
pub mod product;
pub mod rescue;
pub mod shop;
pub mod user;

pub use adoption::{AdoptionQuery, AdoptionRepository};
pub use employee::EmployeeRepository;
pub use inventory::{AdjustmentQuery, AdjustmentRepository};
pub use invoice::{InvoiceQuery, InvoiceRepository};
pub use order::{OrderQuery, OrderRepository};
pub use pet::{PetQuery, PetRepository, PetSort};
pub use product::{ProductQuery, ProductRepository, ProductSort};
pub use rescue::{RescueQuery, RescueRepository};
pub use shop::ShopRepository;
pub use user::UserRepository;
