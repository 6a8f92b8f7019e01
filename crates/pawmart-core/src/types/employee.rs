//! Shop employees and their permission set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an employee may do inside their shop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default)]
    pub can_add_products: bool,
    #[serde(default)]
    pub can_create_invoices: bool,
    #[serde(default)]
    pub can_manage_inventory: bool,
}

impl Permissions {
    pub const fn none() -> Self {
        Permissions {
            can_add_products: false,
            can_create_invoices: false,
            can_manage_inventory: false,
        }
    }
}

/// Links an `employee` user to exactly one shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    /// User id (role `employee`).
    pub user: String,
    pub shop: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub permissions: Permissions,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(user: &str, shop: &str, position: &str, permissions: Permissions) -> Self {
        let now = Utc::now();
        Employee {
            id: uuid::Uuid::new_v4().to_string(),
            user: user.to_string(),
            shop: shop.to_string(),
            position: position.trim().to_string(),
            permissions,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Permissions that are actually in force. A deactivated employee has
    /// none.
    pub fn effective_permissions(&self) -> Permissions {
        if self.is_active {
            self.permissions
        } else {
            Permissions::none()
        }
    }
}

/// Changes a seller may make to an employee record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub position: Option<String>,
    pub permissions: Option<Permissions>,
    pub is_active: Option<bool>,
}

impl EmployeePatch {
    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(position) = self.position {
            employee.position = position.trim().to_string();
        }
        if let Some(permissions) = self.permissions {
            employee.permissions = permissions;
        }
        if let Some(active) = self.is_active {
            employee.is_active = active;
        }
        employee.updated_at = Utc::now();
    }
}
