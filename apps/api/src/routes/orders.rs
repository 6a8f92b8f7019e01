//! # Order Routes
//!
//! ## Placing an Order
//! ```text
//! POST /api/orders { shop, items: [ { product, quantity } ] }
//!        │
//!        ▼
//! BEGIN
//!   for each line:
//!     load product ─── missing ──────────► 404, ROLLBACK
//!     same shop?   ─── no ───────────────► 400, ROLLBACK
//!     UPDATE stock = stock - qty WHERE stock >= qty
//!                  ─── 0 rows ───────────► 400 "Insufficient stock for <name>",
//!                                          ROLLBACK (earlier lines restored)
//!   INSERT order (prices snapshotted)
//! COMMIT
//! ```
//!
//! ```text
//! GET /api/orders               buyer: own | seller: own shop | admin: all
//! GET /api/orders/{id}          buyer | shop owner | admin
//! PUT /api/orders/{id}/status   shop owner | admin: any | buyer: Cancelled
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{check_id, collection, page_request};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource, Subject};
use pawmart_core::types::{Address, Order, OrderItem, OrderStatus, Product, Role};
use pawmart_core::validation::validate_total;
use pawmart_core::workflow::order;
use pawmart_core::CoreError;
use pawmart_db::OrderQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_status))
}

/// Loads an order and checks `action` against its buyer and shop owner.
async fn load_for(
    state: &AppState,
    subject: &Subject,
    id: &str,
    action: Action,
) -> ApiResult<Order> {
    check_id(id, "Order")?;
    let order = state.db.orders().get(id).await?;
    let shop = state.db.shops().get(&order.shop).await?;
    authorize(
        subject,
        action,
        &Resource::Order {
            buyer: &order.buyer,
            shop_owner: &shop.owner,
        },
    )?;
    Ok(order)
}

#[derive(Debug, Deserialize)]
struct OrderListParams {
    status: Option<OrderStatus>,
    shop: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_orders(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiQuery(params): ApiQuery<OrderListParams>,
) -> ApiResult<Json<Value>> {
    let mut query = OrderQuery {
        buyer: None,
        shop: params.shop,
        status: params.status,
    };

    match subject.role {
        Role::Admin => {}
        Role::Seller => match state.db.shops().find_by_owner(&subject.user_id).await? {
            Some(shop) => query.shop = Some(shop.id),
            None => query.buyer = Some(subject.user_id.clone()),
        },
        _ => query.buyer = Some(subject.user_id.clone()),
    }

    let page = state
        .db
        .orders()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("orders", page)
}

async fn get_order(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(load_for(&state, &subject, &id, Action::ReadOrder).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderLine {
    #[serde(alias = "productId")]
    product: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    shop: String,
    #[serde(default)]
    items: Vec<OrderLine>,
    shipping_address: Option<Address>,
    notes: Option<String>,
}

async fn create_order(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    order::validate_lines(req.items.iter().map(|line| &line.quantity))?;
    check_id(&req.shop, "Shop")?;
    let shop = state.db.shops().get(&req.shop).await?;

    let mut uow = state.db.begin().await?;
    let mut items = Vec::with_capacity(req.items.len());

    for line in &req.items {
        check_id(&line.product, "Product")?;
        let product: Product = uow.fetch(&line.product).await?;
        if product.shop != shop.id {
            return Err(ApiError::bad_request(format!(
                "{} is not sold by this shop",
                product.name
            )));
        }

        let taken = product.can_fulfil(line.quantity)
            && uow.decrement_stock(&product.id, line.quantity).await?;
        if !taken {
            warn!(
                product_id = %product.id,
                available = product.stock,
                requested = line.quantity,
                "Order rejected, rolling back"
            );
            return Err(CoreError::InsufficientStock {
                product: product.name,
                available: product.stock,
                requested: line.quantity,
            }
            .into());
        }

        items.push(OrderItem {
            product: product.id,
            name: product.name,
            quantity: line.quantity,
            unit_price: product.price,
        });
    }
    validate_total(items.iter().map(|i| (i.unit_price, i.quantity)))?;

    let placed = Order::new(
        &subject.user_id,
        &shop.id,
        items,
        req.shipping_address,
        req.notes,
    );
    uow.insert(&placed).await?;
    uow.commit().await?;

    info!(
        order_id = %placed.id,
        shop_id = %shop.id,
        lines = placed.items.len(),
        total = placed.total.cents(),
        "Order placed"
    );
    Ok((StatusCode::CREATED, Json(placed)))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: OrderStatus,
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<Order>> {
    let mut current = load_for(&state, &subject, &id, Action::SetOrderStatus(req.status)).await?;

    let transition = order::next_state(current.status, req.status)?;
    order::apply(transition, &mut current, Utc::now());
    if !state.db.orders().update_status(&current, transition.from).await? {
        let stored = state.db.orders().get(&id).await?;
        return Err(CoreError::invalid_transition("order", stored.status, req.status).into());
    }

    info!(
        order_id = %current.id,
        from = %transition.from,
        to = %transition.to,
        "Order status changed"
    );
    Ok(Json(current))
}
