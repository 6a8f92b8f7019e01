//! # Invoice Routes
//!
//! ```text
//! GET  /api/invoices              owner | shop employee | admin (all shops)
//! POST /api/invoices              owner | employee (canCreateInvoices)
//! GET  /api/invoices/{id}         owner | shop employee | admin
//! PUT  /api/invoices/{id}/status  owner | employee (canCreateInvoices) | admin
//! ```
//!
//! Line prices come from the shop's products at issue time. Issuing an
//! invoice never touches stock.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{callers_shop, check_id, collection, employment_of, page_request, shop_resource};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Subject};
use pawmart_core::types::{Invoice, InvoiceCustomer, InvoiceItem, InvoiceStatus, Role};
use pawmart_core::validation::{
    validate_line_count, validate_name, validate_quantity, validate_tax_rate_bps, validate_total,
    Validator,
};
use pawmart_core::workflow::invoice;
use pawmart_core::{CoreError, TaxRate};
use pawmart_db::InvoiceQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/{id}", get(get_invoice))
        .route("/{id}/status", put(update_status))
}

async fn load_for(
    state: &AppState,
    subject: &Subject,
    id: &str,
    action: Action,
) -> ApiResult<Invoice> {
    check_id(id, "Invoice")?;
    let invoice = state.db.invoices().get(id).await?;
    let shop = state.db.shops().get(&invoice.shop).await?;
    let employment = employment_of(&state.db, subject).await?;
    authorize(subject, action, &shop_resource(&shop, employment.as_ref()))?;
    Ok(invoice)
}

#[derive(Debug, Deserialize)]
struct InvoiceListParams {
    status: Option<InvoiceStatus>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiQuery(params): ApiQuery<InvoiceListParams>,
) -> ApiResult<Json<Value>> {
    let shop = if subject.role == Role::Admin {
        None
    } else {
        let employment = employment_of(&state.db, &subject).await?;
        let shop = callers_shop(&state.db, &subject, employment.as_ref()).await?;
        authorize(
            &subject,
            Action::ViewInvoices,
            &shop_resource(&shop, employment.as_ref()),
        )?;
        Some(shop.id)
    };

    let query = InvoiceQuery {
        shop,
        status: params.status,
    };
    let page = state
        .db
        .invoices()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("invoices", page)
}

async fn get_invoice(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(load_for(&state, &subject, &id, Action::ViewInvoices).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceLine {
    #[serde(alias = "productId")]
    product: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInvoiceRequest {
    customer: InvoiceCustomer,
    #[serde(default)]
    items: Vec<InvoiceLine>,
    #[serde(default)]
    tax_rate_bps: u32,
    notes: Option<String>,
}

async fn create_invoice(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(req): ApiJson<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let employment = employment_of(&state.db, &subject).await?;
    let shop = callers_shop(&state.db, &subject, employment.as_ref()).await?;
    authorize(
        &subject,
        Action::CreateInvoice,
        &shop_resource(&shop, employment.as_ref()),
    )?;

    let mut validator = Validator::new();
    validator
        .check(validate_name("customer.name", &req.customer.name))
        .check(validate_tax_rate_bps(req.tax_rate_bps));
    validator.check(validate_line_count(req.items.len()));
    for line in &req.items {
        validator.check(validate_quantity(line.quantity));
    }
    validator.finish()?;

    let mut items = Vec::with_capacity(req.items.len());
    for line in &req.items {
        check_id(&line.product, "Product")?;
        let product = state.db.products().get(&line.product).await?;
        if product.shop != shop.id {
            return Err(ApiError::bad_request(format!(
                "{} is not sold by this shop",
                product.name
            )));
        }
        items.push(InvoiceItem::new(
            &product.id,
            &product.name,
            line.quantity,
            product.price,
        ));
    }
    validate_total(items.iter().map(|i| (i.unit_price, i.quantity)))?;

    let mut uow = state.db.begin().await?;
    let number = uow.next_invoice_number(Utc::now().date_naive()).await?;
    let issued = Invoice::new(
        number,
        &shop.id,
        &subject.user_id,
        req.customer,
        items,
        TaxRate::from_bps(req.tax_rate_bps),
        req.notes,
    );
    uow.insert(&issued).await?;
    uow.commit().await?;

    info!(
        invoice_id = %issued.id,
        number = %issued.invoice_number,
        shop_id = %shop.id,
        total = issued.total.cents(),
        "Invoice issued"
    );
    Ok((StatusCode::CREATED, Json(issued)))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: InvoiceStatus,
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<Invoice>> {
    let mut current = load_for(&state, &subject, &id, Action::SetInvoiceStatus).await?;
    let from = current.status;

    invoice::apply(&mut current, req.status, Utc::now())?;
    if !state.db.invoices().update_status(&current, from).await? {
        let stored = state.db.invoices().get(&id).await?;
        return Err(CoreError::invalid_transition("invoice", stored.status, req.status).into());
    }

    info!(
        invoice_id = %current.id,
        from = %from,
        to = %current.status,
        "Invoice status changed"
    );
    Ok(Json(current))
}
