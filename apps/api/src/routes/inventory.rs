//! # Inventory Adjustment Routes
//!
//! ```text
//! GET  /api/inventory/adjustments              shop owner | shop employee
//! POST /api/inventory/adjustments              employee (canManageInventory)
//! GET  /api/inventory/adjustments/{id}         shop owner | shop employee
//! PUT  /api/inventory/adjustments/{id}/status  shop owner
//! ```
//!
//! Opening an approved adjustment and approving a pending one both write
//! `product.stock = newStock` inside the same transaction as the
//! adjustment record. A review is stored only while the adjustment is
//! still `pending`, so two reviews of one adjustment cannot both land.

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
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Subject};
use pawmart_core::types::{
    AdjustmentStatus, AdjustmentType, InventoryAdjustment, NewAdjustment, Product, Shop,
};
use pawmart_core::workflow::inventory;
use pawmart_core::CoreError;
use pawmart_db::AdjustmentQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/adjustments", get(list_adjustments).post(create_adjustment))
        .route("/adjustments/{id}", get(get_adjustment))
        .route("/adjustments/{id}/status", put(review_adjustment))
}

/// Loads an adjustment and checks `action` against the shop it belongs to.
async fn load_for(
    state: &AppState,
    subject: &Subject,
    id: &str,
    action: Action,
) -> ApiResult<InventoryAdjustment> {
    check_id(id, "Adjustment")?;
    let adjustment = state.db.adjustments().get(id).await?;
    let shop = state.db.shops().get(&adjustment.shop).await?;
    let employment = employment_of(&state.db, subject).await?;
    authorize(subject, action, &shop_resource(&shop, employment.as_ref()))?;
    Ok(adjustment)
}

#[derive(Debug, Deserialize)]
struct AdjustmentListParams {
    status: Option<AdjustmentStatus>,
    product: Option<String>,
    #[serde(rename = "type")]
    adjustment_type: Option<AdjustmentType>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_adjustments(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiQuery(params): ApiQuery<AdjustmentListParams>,
) -> ApiResult<Json<Value>> {
    let employment = employment_of(&state.db, &subject).await?;
    let shop = callers_shop(&state.db, &subject, employment.as_ref()).await?;
    authorize(
        &subject,
        Action::ViewAdjustments,
        &shop_resource(&shop, employment.as_ref()),
    )?;

    let query = AdjustmentQuery {
        status: params.status,
        product: params.product,
        adjustment_type: params.adjustment_type,
        ..AdjustmentQuery::for_shop(&shop.id)
    };
    let page = state
        .db
        .adjustments()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("adjustments", page)
}

async fn get_adjustment(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryAdjustment>> {
    Ok(Json(
        load_for(&state, &subject, &id, Action::ViewAdjustments).await?,
    ))
}

async fn create_adjustment(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(new): ApiJson<NewAdjustment>,
) -> ApiResult<(StatusCode, Json<InventoryAdjustment>)> {
    check_id(&new.product, "Product")?;
    let employment = employment_of(&state.db, &subject).await?;

    let mut uow = state.db.begin().await?;
    let product: Product = uow.fetch(&new.product).await?;
    let shop: Shop = uow.fetch(&product.shop).await?;
    authorize(
        &subject,
        Action::CreateAdjustment,
        &shop_resource(&shop, employment.as_ref()),
    )?;

    let adjustment = inventory::open_adjustment(new, &product, &subject.user_id, Utc::now())?;
    uow.insert(&adjustment).await?;
    if adjustment.status == AdjustmentStatus::Approved {
        uow.set_stock(&product.id, adjustment.new_stock).await?;
    }
    uow.commit().await?;

    info!(
        adjustment_id = %adjustment.id,
        product_id = %product.id,
        status = %adjustment.status,
        previous = adjustment.previous_stock,
        new_stock = adjustment.new_stock,
        "Inventory adjustment opened"
    );
    Ok((StatusCode::CREATED, Json(adjustment)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewRequest {
    status: AdjustmentStatus,
    rejection_reason: Option<String>,
}

async fn review_adjustment(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> ApiResult<Json<InventoryAdjustment>> {
    check_id(&id, "Adjustment")?;
    let employment = employment_of(&state.db, &subject).await?;

    let mut uow = state.db.begin().await?;
    let mut adjustment: InventoryAdjustment = uow.fetch(&id).await?;
    let shop: Shop = uow.fetch(&adjustment.shop).await?;
    authorize(
        &subject,
        Action::ReviewAdjustment,
        &shop_resource(&shop, employment.as_ref()),
    )?;

    let stock = inventory::review(
        &mut adjustment,
        req.status,
        &subject.user_id,
        req.rejection_reason,
        Utc::now(),
    )?;

    let from = AdjustmentStatus::Pending.as_str();
    if !uow.replace_if_status(&adjustment, from).await? {
        return Err(CoreError::invalid_transition("adjustment", from, req.status).into());
    }
    if let Some(stock) = stock {
        uow.set_stock(&adjustment.product, stock).await?;
    }
    uow.commit().await?;

    info!(
        adjustment_id = %adjustment.id,
        status = %adjustment.status,
        reviewer = %subject.user_id,
        "Inventory adjustment reviewed"
    );
    Ok(Json(adjustment))
}
