//! Inventory adjustments: proposed or applied stock changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Restock,
    Adjustment,
    Sale,
    Damaged,
    Expired,
}

impl AdjustmentType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Restock => "restock",
            AdjustmentType::Adjustment => "adjustment",
            AdjustmentType::Sale => "sale",
            AdjustmentType::Damaged => "damaged",
            AdjustmentType::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdjustmentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AdjustmentStatus::Pending => "pending",
            AdjustmentStatus::Approved => "approved",
            AdjustmentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stock change against one product.
///
/// `previous_stock` is a snapshot taken at creation. `new_stock` is
/// supplied by the employee and written to the product when the
/// adjustment is (or becomes) approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdjustment {
    pub id: String,
    pub product: String,
    pub shop: String,
    /// User id of the employee who filed it.
    pub employee: String,
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
    pub quantity_change: i64,
    #[serde(default)]
    pub damaged_quantity: i64,
    #[serde(default)]
    pub expired_quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: AdjustmentStatus,
    pub requires_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an employee submits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdjustment {
    pub product: String,
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
    #[serde(default)]
    pub quantity_change: i64,
    #[serde(default)]
    pub damaged_quantity: i64,
    #[serde(default)]
    pub expired_quantity: i64,
    pub new_stock: i64,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_field_name() {
        let new: NewAdjustment = serde_json::from_value(json!({
            "product": "p1",
            "type": "restock",
            "quantityChange": 10,
            "newStock": 15
        }))
        .unwrap();
        assert_eq!(new.adjustment_type, AdjustmentType::Restock);
        assert_eq!(new.damaged_quantity, 0);
    }
}
