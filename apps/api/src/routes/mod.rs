//! # HTTP Routes
//!
//! One module per resource. Each exposes `routes()` returning a
//! `Router<AppState>`; [`api_routes`] nests them under `/api`.
//!
//! ```text
//! /health
//! /api/users        register, login, profile, favorites, cart
//! /api/pets         catalog
//! /api/adoptions    application workflow
//! /api/rescues      rescue operations and donations
//! /api/shops        shop profiles
//! /api/products     catalog and direct stock
//! /api/employees    shop staff
//! /api/orders       purchase orders
//! /api/inventory    adjustment workflow
//! /api/invoices     shop invoices
//! ```

pub mod adoptions;
pub mod employees;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod orders;
pub mod pets;
pub mod products;
pub mod rescues;
pub mod shops;
pub mod users;

use axum::Json;
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use pawmart_core::policy::{Resource, Subject};
use pawmart_core::types::{Employee, PageRequest, Role, Shop};
use pawmart_core::validation::is_valid_id;
use pawmart_db::{Database, Page};

/// Every `/api/*` route.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::routes())
        .nest("/pets", pets::routes())
        .nest("/adoptions", adoptions::routes())
        .nest("/rescues", rescues::routes())
        .nest("/shops", shops::routes())
        .nest("/products", products::routes())
        .nest("/employees", employees::routes())
        .nest("/orders", orders::routes())
        .nest("/inventory", inventory::routes())
        .nest("/invoices", invoices::routes())
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Malformed ids are answered like absent ones.
pub(crate) fn check_id(id: &str, entity: &str) -> ApiResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(ApiError::not_found(entity))
    }
}

pub(crate) fn page_request(page: Option<u32>, limit: Option<u32>) -> PageRequest {
    PageRequest::new(page, limit)
}

/// `{ "<key>": [...], "pagination": {...} }`
pub(crate) fn collection<T: Serialize>(key: &str, page: Page<T>) -> ApiResult<Json<Value>> {
    let items = serde_json::to_value(&page.items).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize collection");
        ApiError::Server
    })?;
    Ok(Json(json!({ key: items, "pagination": page.pagination })))
}

/// The caller's employment record, if the caller is an employee.
pub(crate) async fn employment_of(db: &Database, subject: &Subject) -> ApiResult<Option<Employee>> {
    if subject.role != Role::Employee {
        return Ok(None);
    }
    Ok(db.employees().find_by_user(&subject.user_id).await?)
}

/// Shop ownership facts for the policy, with the caller's employment.
pub(crate) fn shop_resource<'a>(shop: &'a Shop, employment: Option<&'a Employee>) -> Resource<'a> {
    Resource::Shop {
        id: &shop.id,
        owner: &shop.owner,
        employment,
    }
}

/// Shop the caller works in: their own (seller) or their employer's
/// (employee).
pub(crate) async fn callers_shop(
    db: &Database,
    subject: &Subject,
    employment: Option<&Employee>,
) -> ApiResult<Shop> {
    let shop = match (subject.role, employment) {
        (Role::Seller, _) => db.shops().find_by_owner(&subject.user_id).await?,
        (Role::Employee, Some(e)) => db.shops().find(&e.shop).await?,
        _ => None,
    };
    shop.ok_or_else(|| ApiError::not_found("Shop"))
}
