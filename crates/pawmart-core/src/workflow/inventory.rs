//! # Inventory Adjustment Workflow
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Employee submits adjustment                                            │
//! │       │                                                                 │
//! │       ├── damaged > 0 OR expired > 0 ──► pending (requiresApproval)     │
//! │       │                                     │                           │
//! │       │                     shop owner ─────┼──► approved               │
//! │       │                                     │      └─ stock ← newStock  │
//! │       │                                     └──► rejected (reason)      │
//! │       │                                            └─ stock untouched   │
//! │       │                                                                 │
//! │       └── otherwise ──► approved at once, stock ← newStock              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `newStock` is taken from the employee as submitted; it is not derived
//! from `previousStock` and the quantities.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{AdjustmentStatus, InventoryAdjustment, NewAdjustment, Product};

/// Status a new adjustment starts in, and whether it needs review.
pub fn initial_status(damaged_quantity: i64, expired_quantity: i64) -> (AdjustmentStatus, bool) {
    let requires_approval = damaged_quantity > 0 || expired_quantity > 0;
    let status = if requires_approval {
        AdjustmentStatus::Pending
    } else {
        AdjustmentStatus::Approved
    };
    (status, requires_approval)
}

/// Validates a submission and builds the adjustment record.
///
/// The caller writes `product.stock = adjustment.new_stock` in the same
/// transaction when the returned adjustment is already `approved`.
pub fn open_adjustment(
    new: NewAdjustment,
    product: &Product,
    employee_user: &str,
    now: DateTime<Utc>,
) -> CoreResult<InventoryAdjustment> {
    non_negative("newStock", new.new_stock)?;
    non_negative("damagedQuantity", new.damaged_quantity)?;
    non_negative("expiredQuantity", new.expired_quantity)?;

    let (status, requires_approval) = initial_status(new.damaged_quantity, new.expired_quantity);

    Ok(InventoryAdjustment {
        id: uuid::Uuid::new_v4().to_string(),
        product: product.id.clone(),
        shop: product.shop.clone(),
        employee: employee_user.to_string(),
        adjustment_type: new.adjustment_type,
        quantity_change: new.quantity_change,
        damaged_quantity: new.damaged_quantity,
        expired_quantity: new.expired_quantity,
        previous_stock: product.stock,
        new_stock: new.new_stock,
        reason: new.reason,
        status,
        requires_approval,
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    })
}

fn non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Review decisions are only possible from `pending`.
pub fn next_state(
    current: AdjustmentStatus,
    requested: AdjustmentStatus,
) -> CoreResult<AdjustmentStatus> {
    match (current, requested) {
        (AdjustmentStatus::Pending, AdjustmentStatus::Approved | AdjustmentStatus::Rejected) => {
            Ok(requested)
        }
        _ => Err(CoreError::invalid_transition("adjustment", current, requested)),
    }
}

/// Applies a review decision.
///
/// Returns the stock value to write to the product, which is `Some` only
/// when the adjustment was approved.
pub fn review(
    adjustment: &mut InventoryAdjustment,
    decision: AdjustmentStatus,
    reviewer: &str,
    rejection_reason: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<Option<i64>> {
    let to = next_state(adjustment.status, decision)?;

    let stock = match to {
        AdjustmentStatus::Approved => {
            adjustment.approved_by = Some(reviewer.to_string());
            adjustment.approved_at = Some(now);
            Some(adjustment.new_stock)
        }
        _ => {
            let reason = rejection_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ValidationError::Required {
                    field: "rejectionReason".to_string(),
                })?;
            adjustment.rejection_reason = Some(reason);
            None
        }
    };

    adjustment.status = to;
    adjustment.updated_at = now;
    Ok(stock)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{AdjustmentType, NewProduct, ProductCategory};

    fn product(stock: i64) -> Product {
        NewProduct {
            name: "Dental Chews".into(),
            description: String::new(),
            category: ProductCategory::Health,
            price: Money::from_cents(899),
            stock,
            images: vec![],
            pet_types: vec![],
            brand: None,
            sku: None,
        }
        .into_product("shop-1")
    }

    fn submission(damaged: i64, new_stock: i64) -> NewAdjustment {
        NewAdjustment {
            product: "ignored".into(),
            adjustment_type: if damaged > 0 {
                AdjustmentType::Damaged
            } else {
                AdjustmentType::Restock
            },
            quantity_change: 10,
            damaged_quantity: damaged,
            expired_quantity: 0,
            new_stock,
            reason: None,
        }
    }

    #[test]
    fn test_restock_is_approved_immediately() {
        let adj = open_adjustment(submission(0, 15), &product(5), "emp", Utc::now()).unwrap();
        assert_eq!(adj.status, AdjustmentStatus::Approved);
        assert!(!adj.requires_approval);
        assert_eq!(adj.previous_stock, 5);
        assert_eq!(adj.new_stock, 15);
        assert_eq!(adj.shop, "shop-1");
    }

    #[test]
    fn test_damaged_requires_approval() {
        let adj = open_adjustment(submission(2, 3), &product(5), "emp", Utc::now()).unwrap();
        assert_eq!(adj.status, AdjustmentStatus::Pending);
        assert!(adj.requires_approval);
        assert_eq!(initial_status(0, 1), (AdjustmentStatus::Pending, true));
    }

    #[test]
    fn test_negative_new_stock_rejected() {
        let err = open_adjustment(submission(0, -1), &product(5), "emp", Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_review_approve_returns_stock() {
        let mut adj = open_adjustment(submission(2, 3), &product(5), "emp", Utc::now()).unwrap();
        let stock = review(&mut adj, AdjustmentStatus::Approved, "owner", None, Utc::now()).unwrap();
        assert_eq!(stock, Some(3));
        assert_eq!(adj.approved_by.as_deref(), Some("owner"));

        // Already reviewed.
        assert!(matches!(
            review(&mut adj, AdjustmentStatus::Rejected, "owner", Some("x".into()), Utc::now()),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_review_reject_requires_reason() {
        let mut adj = open_adjustment(submission(2, 3), &product(5), "emp", Utc::now()).unwrap();
        assert!(matches!(
            review(&mut adj, AdjustmentStatus::Rejected, "owner", Some("  ".into()), Utc::now()),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(adj.status, AdjustmentStatus::Pending);

        let stock = review(
            &mut adj,
            AdjustmentStatus::Rejected,
            "owner",
            Some("Count was wrong".into()),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(stock, None);
        assert_eq!(adj.status, AdjustmentStatus::Rejected);
    }

    #[test]
    fn test_cannot_request_pending() {
        assert!(next_state(AdjustmentStatus::Pending, AdjustmentStatus::Pending).is_err());
    }
}
