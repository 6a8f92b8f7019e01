//! # Authorization Policy
//!
//! Every role and ownership rule in PawMart is decided here, by one
//! function: [`authorize`]. HTTP handlers load whatever ownership facts the
//! action needs, describe them as a [`Resource`], and ask.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Subject { user_id, role }   Action        Resource (ownership facts)   │
//! │            │                     │                   │                  │
//! │            └─────────────────────┼───────────────────┘                  │
//! │                                  ▼                                      │
//! │                        authorize(s, a, r)                               │
//! │                                  │                                      │
//! │                  ┌───────────────┴───────────────┐                      │
//! │                  ▼                               ▼                      │
//! │               Ok(())                   CoreError::Forbidden             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use pawmart_core::policy::{authorize, Action, Resource, Subject};
//! use pawmart_core::types::Role;
//!
//! let provider = Subject::new("u-1", Role::Ngo);
//! let stranger = Subject::new("u-2", Role::Buyer);
//! let pet = Resource::Pet { provider: "u-1" };
//!
//! assert!(authorize(&provider, Action::UpdatePet, &pet).is_ok());
//! assert!(authorize(&stranger, Action::UpdatePet, &pet).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{AdoptionStatus, Employee, OrderStatus, Permissions, Role, TeamMember};

// =============================================================================
// Subject
// =============================================================================

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub user_id: String,
    pub role: Role,
}

impl Subject {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Subject {
            user_id: user_id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[inline]
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

// =============================================================================
// Action
// =============================================================================

/// Every guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListUsers,

    CreatePet,
    UpdatePet,
    DeletePet,

    ReadAdoption,
    SetAdoptionStatus(AdoptionStatus),
    MessageAdoption,
    AddAdoptionNote,
    AddFollowUp,

    CreateRescue,
    /// Edit details, status, outcomes and team.
    ManageRescue,
    PostRescueUpdate,

    CreateShop,
    UpdateShop,

    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    SetProductStock,

    ManageEmployees,

    CreateAdjustment,
    ViewAdjustments,
    ReviewAdjustment,

    CreateInvoice,
    ViewInvoices,
    SetInvoiceStatus,

    ReadOrder,
    SetOrderStatus(OrderStatus),
}

impl Action {
    /// Human description used in Forbidden messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Action::ListUsers => "list users",
            Action::CreatePet => "create pet listings",
            Action::UpdatePet => "update this pet",
            Action::DeletePet => "delete this pet",
            Action::ReadAdoption => "view this adoption",
            Action::SetAdoptionStatus(_) => "update this adoption",
            Action::MessageAdoption => "message on this adoption",
            Action::AddAdoptionNote => "add notes to this adoption",
            Action::AddFollowUp => "add follow-ups to this adoption",
            Action::CreateRescue => "create rescues",
            Action::ManageRescue => "manage this rescue",
            Action::PostRescueUpdate => "post updates to this rescue",
            Action::CreateShop => "create a shop",
            Action::UpdateShop => "update this shop",
            Action::CreateProduct => "add products to this shop",
            Action::UpdateProduct => "update this product",
            Action::DeleteProduct => "delete this product",
            Action::SetProductStock => "change stock for this product",
            Action::ManageEmployees => "manage employees of this shop",
            Action::CreateAdjustment => "adjust inventory for this product",
            Action::ViewAdjustments => "view inventory adjustments of this shop",
            Action::ReviewAdjustment => "review inventory adjustments",
            Action::CreateInvoice => "create invoices for this shop",
            Action::ViewInvoices => "view invoices of this shop",
            Action::SetInvoiceStatus => "update this invoice",
            Action::ReadOrder => "view this order",
            Action::SetOrderStatus(_) => "update this order",
        }
    }
}

// =============================================================================
// Resource
// =============================================================================

/// Ownership facts about the target of an action.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// Role-only decision.
    None,
    Pet {
        provider: &'a str,
    },
    Adoption {
        applicant: &'a str,
        provider: &'a str,
    },
    Rescue {
        ngo: &'a str,
        team: &'a [TeamMember],
    },
    /// A shop, with the caller's employment record if they have one.
    Shop {
        id: &'a str,
        owner: &'a str,
        employment: Option<&'a Employee>,
    },
    Order {
        buyer: &'a str,
        shop_owner: &'a str,
    },
}

// =============================================================================
// Decision
// =============================================================================

/// Decides whether `subject` may perform `action` on `resource`.
///
/// A resource of the wrong kind for the action is refused.
pub fn authorize(subject: &Subject, action: Action, resource: &Resource<'_>) -> CoreResult<()> {
    if is_allowed(subject, action, resource) {
        Ok(())
    } else {
        Err(CoreError::forbidden(action.describe()))
    }
}

fn is_allowed(s: &Subject, action: Action, resource: &Resource<'_>) -> bool {
    use Action::*;

    let admin = s.is_admin();

    match (action, *resource) {
        (ListUsers, _) => admin,

        (CreatePet, _) => admin || s.role.is_provider(),
        (UpdatePet | DeletePet, Resource::Pet { provider }) => admin || s.is(provider),

        (
            ReadAdoption | MessageAdoption | AddFollowUp,
            Resource::Adoption {
                applicant,
                provider,
            },
        ) => admin || s.is(applicant) || s.is(provider),
        (AddAdoptionNote, Resource::Adoption { provider, .. }) => admin || s.is(provider),
        (
            SetAdoptionStatus(to),
            Resource::Adoption {
                applicant,
                provider,
            },
        ) => {
            admin || s.is(provider) || (to == AdoptionStatus::Cancelled && s.is(applicant))
        }

        (CreateRescue, _) => admin || s.role == Role::Ngo,
        (ManageRescue, Resource::Rescue { ngo, .. }) => admin || s.is(ngo),
        (PostRescueUpdate, Resource::Rescue { ngo, team }) => {
            admin || s.is(ngo) || team.iter().any(|t| s.is(&t.member))
        }

        (CreateShop, _) => s.role == Role::Seller,
        (UpdateShop, Resource::Shop { owner, .. }) => admin || s.is(owner),

        (
            CreateProduct,
            Resource::Shop {
                id,
                owner,
                employment,
            },
        ) => s.is(owner) || staff_can(s, id, employment, |p| p.can_add_products),
        (UpdateProduct | DeleteProduct, Resource::Shop { owner, .. }) => admin || s.is(owner),
        (
            SetProductStock,
            Resource::Shop {
                id,
                owner,
                employment,
            },
        ) => s.is(owner) || staff_can(s, id, employment, |p| p.can_manage_inventory),

        (ManageEmployees, Resource::Shop { owner, .. }) => admin || s.is(owner),

        (CreateAdjustment, Resource::Shop { id, employment, .. }) => {
            staff_can(s, id, employment, |p| p.can_manage_inventory)
        }
        (
            ViewAdjustments,
            Resource::Shop {
                id,
                owner,
                employment,
            },
        ) => s.is(owner) || staff_can(s, id, employment, |_| true),
        (ReviewAdjustment, Resource::Shop { owner, .. }) => s.is(owner),

        (
            CreateInvoice | SetInvoiceStatus,
            Resource::Shop {
                id,
                owner,
                employment,
            },
        ) => admin || s.is(owner) || staff_can(s, id, employment, |p| p.can_create_invoices),
        (
            ViewInvoices,
            Resource::Shop {
                id,
                owner,
                employment,
            },
        ) => admin || s.is(owner) || staff_can(s, id, employment, |_| true),

        (ReadOrder, Resource::Order { buyer, shop_owner }) => {
            admin || s.is(buyer) || s.is(shop_owner)
        }
        (SetOrderStatus(to), Resource::Order { buyer, shop_owner }) => {
            admin || s.is(shop_owner) || (to == OrderStatus::Cancelled && s.is(buyer))
        }

        _ => false,
    }
}

/// True when the subject is an active employee of `shop_id` whose
/// permissions satisfy `check`.
fn staff_can(
    s: &Subject,
    shop_id: &str,
    employment: Option<&Employee>,
    check: impl Fn(&Permissions) -> bool,
) -> bool {
    match employment {
        Some(e) if s.role == Role::Employee && s.is(&e.user) && e.shop == shop_id => {
            e.is_active && check(&e.effective_permissions())
        }
        _ => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str, role: Role) -> Subject {
        Subject::new(id, role)
    }

    fn employee(user: &str, shop: &str, permissions: Permissions) -> Employee {
        Employee::new(user, shop, "Clerk", permissions)
    }

    #[test]
    fn test_pet_rules() {
        let pet = Resource::Pet { provider: "ngo-1" };
        assert!(authorize(&subject("ngo-1", Role::Ngo), Action::UpdatePet, &pet).is_ok());
        assert!(authorize(&subject("adm", Role::Admin), Action::DeletePet, &pet).is_ok());
        assert!(authorize(&subject("ngo-2", Role::Ngo), Action::DeletePet, &pet).is_err());

        assert!(authorize(&subject("b", Role::Buyer), Action::CreatePet, &Resource::None).is_err());
        assert!(authorize(&subject("s", Role::Seller), Action::CreatePet, &Resource::None).is_ok());
        assert!(
            authorize(&subject("e", Role::Employee), Action::CreatePet, &Resource::None).is_err()
        );
    }

    #[test]
    fn test_adoption_rules() {
        let adoption = Resource::Adoption {
            applicant: "app",
            provider: "prov",
        };
        let applicant = subject("app", Role::Buyer);
        let provider = subject("prov", Role::Seller);
        let stranger = subject("x", Role::Buyer);

        assert!(authorize(&applicant, Action::ReadAdoption, &adoption).is_ok());
        assert!(authorize(&stranger, Action::ReadAdoption, &adoption).is_err());

        let approve = Action::SetAdoptionStatus(AdoptionStatus::Approved);
        let cancel = Action::SetAdoptionStatus(AdoptionStatus::Cancelled);
        assert!(authorize(&provider, approve, &adoption).is_ok());
        assert!(authorize(&applicant, approve, &adoption).is_err());
        assert!(authorize(&applicant, cancel, &adoption).is_ok());
        assert!(authorize(&stranger, cancel, &adoption).is_err());

        assert!(authorize(&applicant, Action::AddAdoptionNote, &adoption).is_err());
        assert!(authorize(&provider, Action::AddAdoptionNote, &adoption).is_ok());
    }

    #[test]
    fn test_rescue_rules() {
        let team = vec![TeamMember {
            member: "vol".into(),
            role: "driver".into(),
        }];
        let rescue = Resource::Rescue {
            ngo: "ngo",
            team: &team,
        };

        assert!(authorize(&subject("vol", Role::Buyer), Action::PostRescueUpdate, &rescue).is_ok());
        assert!(authorize(&subject("vol", Role::Buyer), Action::ManageRescue, &rescue).is_err());
        assert!(authorize(&subject("ngo", Role::Ngo), Action::ManageRescue, &rescue).is_ok());
        assert!(authorize(&subject("s", Role::Seller), Action::CreateRescue, &Resource::None).is_err());
    }

    #[test]
    fn test_employee_permissions_scope_to_their_shop() {
        let perms = Permissions {
            can_manage_inventory: true,
            ..Permissions::none()
        };
        let record = employee("emp", "shop-1", perms);
        let emp = subject("emp", Role::Employee);

        let own_shop = Resource::Shop {
            id: "shop-1",
            owner: "seller",
            employment: Some(&record),
        };
        let other_shop = Resource::Shop {
            id: "shop-2",
            owner: "seller-2",
            employment: Some(&record),
        };

        assert!(authorize(&emp, Action::CreateAdjustment, &own_shop).is_ok());
        assert!(authorize(&emp, Action::SetProductStock, &own_shop).is_ok());
        assert!(authorize(&emp, Action::CreateAdjustment, &other_shop).is_err());
        assert!(authorize(&emp, Action::CreateProduct, &own_shop).is_err());
        assert!(authorize(&emp, Action::ReviewAdjustment, &own_shop).is_err());
        assert!(authorize(&subject("seller", Role::Seller), Action::ReviewAdjustment, &own_shop).is_ok());
    }

    #[test]
    fn test_deactivated_employee_loses_permissions() {
        let mut record = employee(
            "emp",
            "shop-1",
            Permissions {
                can_add_products: true,
                can_create_invoices: true,
                can_manage_inventory: true,
            },
        );
        record.is_active = false;
        let shop = Resource::Shop {
            id: "shop-1",
            owner: "seller",
            employment: Some(&record),
        };
        let emp = subject("emp", Role::Employee);

        assert!(authorize(&emp, Action::CreateAdjustment, &shop).is_err());
        assert!(authorize(&emp, Action::CreateInvoice, &shop).is_err());
        assert!(authorize(&emp, Action::ViewAdjustments, &shop).is_err());
    }

    #[test]
    fn test_order_status_rules() {
        let order = Resource::Order {
            buyer: "buyer",
            shop_owner: "seller",
        };
        let buyer = subject("buyer", Role::Buyer);
        let seller = subject("seller", Role::Seller);

        assert!(authorize(&buyer, Action::SetOrderStatus(OrderStatus::Cancelled), &order).is_ok());
        assert!(authorize(&buyer, Action::SetOrderStatus(OrderStatus::Completed), &order).is_err());
        assert!(authorize(&seller, Action::SetOrderStatus(OrderStatus::Pending), &order).is_ok());
        assert!(authorize(&subject("x", Role::Buyer), Action::ReadOrder, &order).is_err());
    }

    #[test]
    fn test_wrong_resource_kind_is_refused() {
        let admin = subject("adm", Role::Admin);
        assert!(authorize(&admin, Action::UpdatePet, &Resource::None).is_err());
        assert!(authorize(&admin, Action::ListUsers, &Resource::None).is_ok());
    }

    #[test]
    fn test_forbidden_message() {
        let err = authorize(&subject("b", Role::Buyer), Action::ListUsers, &Resource::None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to list users");
    }
}
