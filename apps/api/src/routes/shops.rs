//! # Shop Routes
//!
//! ```text
//! GET  /api/shops        public    active shops
//! POST /api/shops        seller    one shop per seller
//! GET  /api/shops/mine   seller | employee
//! GET  /api/shops/{id}   public
//! PUT  /api/shops/{id}   owner | admin
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{callers_shop, check_id, collection, employment_of, page_request};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource};
use pawmart_core::types::{NewShop, Shop, ShopPatch};
use pawmart_core::validation::{validate_email, validate_name, Validator};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shops).post(create_shop))
        .route("/mine", get(my_shop))
        .route("/{id}", get(get_shop).put(update_shop))
}

#[derive(Debug, Deserialize)]
struct ShopListParams {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_shops(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ShopListParams>,
) -> ApiResult<Json<Value>> {
    let page = state
        .db
        .shops()
        .list(page_request(params.page, params.limit))
        .await?;
    collection("shops", page)
}

async fn create_shop(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(new): ApiJson<NewShop>,
) -> ApiResult<(StatusCode, Json<Shop>)> {
    authorize(&subject, Action::CreateShop, &Resource::None)?;

    let mut validator = Validator::new();
    validator.check(validate_name("name", &new.name));
    if let Some(email) = &new.email {
        validator.check(validate_email(email));
    }
    validator.finish()?;

    let shop = new.into_shop(&subject.user_id);
    state.db.shops().create(&shop).await?;

    info!(shop_id = %shop.id, owner = %shop.owner, "Shop opened");
    Ok((StatusCode::CREATED, Json(shop)))
}

async fn my_shop(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> ApiResult<Json<Shop>> {
    let employment = employment_of(&state.db, &subject).await?;
    let shop = callers_shop(&state.db, &subject, employment.as_ref()).await?;
    Ok(Json(shop))
}

async fn get_shop(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Shop>> {
    check_id(&id, "Shop")?;
    Ok(Json(state.db.shops().get(&id).await?))
}

async fn update_shop(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ShopPatch>,
) -> ApiResult<Json<Shop>> {
    check_id(&id, "Shop")?;
    let mut shop = state.db.shops().get(&id).await?;
    authorize(
        &subject,
        Action::UpdateShop,
        &Resource::Shop {
            id: &shop.id,
            owner: &shop.owner,
            employment: None,
        },
    )?;

    let mut validator = Validator::new();
    if let Some(name) = &patch.name {
        validator.check(validate_name("name", name));
    }
    if let Some(email) = &patch.email {
        validator.check(validate_email(email));
    }
    validator.finish()?;

    patch.apply_to(&mut shop);
    state.db.shops().update(&shop).await?;
    Ok(Json(shop))
}
