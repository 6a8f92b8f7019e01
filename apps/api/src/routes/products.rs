//! # Product Routes
//!
//! ```text
//! GET    /api/products             public
//! POST   /api/products             shop owner | employee (canAddProducts)
//! GET    /api/products/{id}        public
//! PUT    /api/products/{id}        shop owner | admin   (stock not accepted)
//! DELETE /api/products/{id}        shop owner | admin
//! PUT    /api/products/{id}/stock  shop owner | employee (canManageInventory)
//! ```
//!
//! The stock endpoint writes `max(0, stock)` directly and bypasses the
//! adjustment workflow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{callers_shop, check_id, collection, employment_of, page_request, shop_resource};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Subject};
use pawmart_core::types::{NewProduct, Product, ProductCategory, ProductPatch, Shop};
use pawmart_core::validation::{validate_name, validate_price_cents, validate_stock, Validator};
use pawmart_db::{ProductQuery, ProductSort};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", put(set_stock))
}

/// Loads a product with its shop and checks `action` against the shop.
async fn load_for(
    state: &AppState,
    subject: &Subject,
    id: &str,
    action: Action,
) -> ApiResult<(Product, Shop)> {
    check_id(id, "Product")?;
    let product = state.db.products().get(id).await?;
    let shop = state.db.shops().get(&product.shop).await?;
    let employment = employment_of(&state.db, subject).await?;
    authorize(subject, action, &shop_resource(&shop, employment.as_ref()))?;
    Ok((product, shop))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListParams {
    shop: Option<String>,
    category: Option<ProductCategory>,
    search: Option<String>,
    min_price: Option<i64>,
    max_price: Option<i64>,
    in_stock: Option<bool>,
    sort: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductListParams>,
) -> ApiResult<Json<Value>> {
    let query = ProductQuery {
        shop: params.shop,
        category: params.category,
        search: params.search,
        min_price: params.min_price,
        max_price: params.max_price,
        in_stock: params.in_stock,
        sort: params
            .sort
            .as_deref()
            .map(ProductSort::from_param)
            .unwrap_or_default(),
    };
    let page = state
        .db
        .products()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("products", page)
}

async fn create_product(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(new): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let employment = employment_of(&state.db, &subject).await?;
    let shop = callers_shop(&state.db, &subject, employment.as_ref()).await?;
    authorize(
        &subject,
        Action::CreateProduct,
        &shop_resource(&shop, employment.as_ref()),
    )?;

    Validator::new()
        .check(validate_name("name", &new.name))
        .check(validate_price_cents("price", new.price.cents()))
        .check(validate_stock("stock", new.stock))
        .finish()?;

    let product = new.into_product(&shop.id);
    state.db.products().create(&product).await?;

    info!(product_id = %product.id, shop_id = %shop.id, "Product added");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    check_id(&id, "Product")?;
    Ok(Json(state.db.products().get(&id).await?))
}

async fn update_product(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let mut validator = Validator::new();
    if let Some(name) = &patch.name {
        validator.check(validate_name("name", name));
    }
    if let Some(price) = patch.price {
        validator.check(validate_price_cents("price", price.cents()));
    }
    validator.finish()?;

    let (mut product, _) = load_for(&state, &subject, &id, Action::UpdateProduct).await?;
    patch.apply_to(&mut product);
    state.db.products().update(&product).await?;

    // Stock may have moved since the read; return what is stored.
    Ok(Json(state.db.products().get(&id).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let (product, _) = load_for(&state, &subject, &id, Action::DeleteProduct).await?;
    state.db.products().delete(&product.id).await?;

    info!(product_id = %product.id, "Product removed");
    Ok(Json(json!({ "message": "Product removed" })))
}

#[derive(Debug, Deserialize)]
struct StockRequest {
    stock: i64,
}

async fn set_stock(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StockRequest>,
) -> ApiResult<Json<Product>> {
    let (product, _) = load_for(&state, &subject, &id, Action::SetProductStock).await?;
    let updated = state.db.products().set_stock(&product.id, req.stock).await?;

    info!(
        product_id = %product.id,
        previous = product.stock,
        stock = updated.stock,
        by = %subject.user_id,
        "Stock set directly"
    );
    Ok(Json(updated))
}
