//! # Order Workflow
//!
//! Orders start `Pending`. The status table accepts any target from any
//! state; restrictions on who may request what live in
//! [`crate::policy`] (a buyer may only cancel).
//!
//! Stock is taken when the order is created, not on status changes.

use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::{Order, OrderStatus};
use crate::validation::{validate_line_count, validate_quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

pub fn next_state(current: OrderStatus, requested: OrderStatus) -> CoreResult<OrderTransition> {
    Ok(OrderTransition {
        from: current,
        to: requested,
    })
}

pub fn apply(transition: OrderTransition, order: &mut Order, now: DateTime<Utc>) {
    order.status = transition.to;
    order.updated_at = now;
}

/// Checks an order request before any product is loaded: 1..=100 lines
/// and every quantity within 1..=999.
pub fn validate_lines<'a>(quantities: impl IntoIterator<Item = &'a i64>) -> CoreResult<()> {
    let mut count = 0usize;
    for qty in quantities {
        validate_quantity(*qty)?;
        count += 1;
    }
    validate_line_count(count)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use OrderStatus::*;

    #[test]
    fn test_any_to_any() {
        for from in [Pending, Completed, Cancelled] {
            for to in [Pending, Completed, Cancelled] {
                assert!(next_state(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_validate_lines() {
        assert!(validate_lines(&[1, 3]).is_ok());
        assert!(matches!(
            validate_lines(&[]),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(validate_lines(&[1, 0]).is_err());
        assert!(validate_lines(&[1; 101]).is_err());
    }
}
