//! # Workflow State Machines
//!
//! One module per entity whose status moves through a lifecycle. Each
//! exposes a `next_state(current, requested)` transition table that either
//! returns the transition (with any side effect it carries) or
//! [`CoreError::InvalidTransition`](crate::error::CoreError::InvalidTransition).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Workflow     States                                  Side effects      │
//! │  ─────────    ────────────────────────────────────    ────────────────  │
//! │  adoption     pending → approved → completed          Pet status        │
//! │               pending → rejected                                        │
//! │               pending|approved → cancelled                              │
//! │                                                                         │
//! │  rescue       planning ⇄ in_progress ⇄ completed ⇄    rescueDate.actual │
//! │               cancelled (any → any)                                     │
//! │                                                                         │
//! │  inventory    pending → approved | rejected           Product stock     │
//! │               (initial state decided by content)                        │
//! │                                                                         │
//! │  order        Pending ⇄ Completed ⇄ Cancelled         none              │
//! │                                                                         │
//! │  invoice      unpaid → paid | cancelled               paidAt            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Who may request a transition is decided separately by
//! [`crate::policy`]. The tables here only know about states.

pub mod adoption;
pub mod inventory;
pub mod invoice;
pub mod order;
pub mod rescue;
