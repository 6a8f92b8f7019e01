//! # Account Routes
//!
//! ```text
//! POST   /api/users/register                 public   201 { token, user }
//! POST   /api/users/login                    public   200 { token, user }
//! GET    /api/users/profile                  auth
//! PUT    /api/users/profile                  auth
//! GET    /api/users                          admin
//! GET    /api/users/favorites                auth     resolved pets/products
//! POST   /api/users/favorites/pets/{id}      auth
//! DELETE /api/users/favorites/pets/{id}      auth
//! POST   /api/users/favorites/products/{id}  auth
//! DELETE /api/users/favorites/products/{id}  auth
//! GET    /api/users/cart                     auth
//! POST   /api/users/cart                     auth     { productId, quantity }
//! DELETE /api/users/cart                     auth     clear
//! PUT    /api/users/cart/{productId}         auth     { quantity } (0 removes)
//! DELETE /api/users/cart/{productId}         auth
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{check_id, collection, page_request};
use crate::auth::{AuthError, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource};
use pawmart_core::types::{
    Cart, CartView, Favorites, Pet, Product, ProfilePatch, Role, User, UserProfile,
};
use pawmart_core::validation::{validate_email, validate_name, validate_password, Validator};
use pawmart_core::ValidationError;
use pawmart_db::password::{hash_password, verify_password};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/favorites", get(get_favorites))
        .route(
            "/favorites/pets/{id}",
            post(add_favorite_pet).delete(remove_favorite_pet),
        )
        .route(
            "/favorites/products/{id}",
            post(add_favorite_product).delete(remove_favorite_product),
        )
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/cart/{product_id}",
            put(update_cart_item).delete(remove_cart_item),
        )
}

// =============================================================================
// Registration and Login
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    role: Option<Role>,
    organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let role = req.role.unwrap_or_default();

    Validator::new()
        .check(validate_name("name", &req.name))
        .check(validate_email(&req.email))
        .check(validate_password(&req.password))
        .check(if role.is_self_registrable() {
            Ok(())
        } else {
            Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: ["buyer", "seller", "ngo"].map(String::from).to_vec(),
            })
        })
        .finish()?;

    let mut user = User::new(&req.name, &req.email, hash_password(&req.password)?, role);
    user.organization = req.organization;
    state.db.users().create(&user).await?;

    info!(user_id = %user.id, role = %user.role, "User registered");

    let token = state.jwt.generate_token(&user.id, user.role)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .db
        .users()
        .find_by_email(&req.email)
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or(AuthError::InvalidCredentials)?;

    let token = state.jwt.generate_token(&user.id, user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

// =============================================================================
// Profile
// =============================================================================

async fn get_profile(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let user = state.db.users().get(&subject.user_id).await?;
    Ok(Json(user.profile()))
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    #[serde(flatten)]
    patch: ProfilePatch,
    password: Option<String>,
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let mut validator = Validator::new();
    if let Some(name) = &req.patch.name {
        validator.check(validate_name("name", name));
    }
    if let Some(password) = &req.password {
        validator.check(validate_password(password));
    }
    validator.finish()?;

    let mut user = state.db.users().get(&subject.user_id).await?;
    req.patch.apply_to(&mut user);
    if let Some(password) = &req.password {
        user.password_hash = hash_password(password)?;
    }
    state.db.users().update(&user).await?;

    let stored = state.db.users().get(&subject.user_id).await?;
    Ok(Json(stored.profile()))
}

#[derive(Debug, Deserialize)]
struct ListUsersParams {
    role: Option<Role>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_users(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiQuery(params): ApiQuery<ListUsersParams>,
) -> ApiResult<Json<Value>> {
    authorize(&subject, Action::ListUsers, &Resource::None)?;

    let page = state
        .db
        .users()
        .list(params.role, page_request(params.page, params.limit))
        .await?;
    collection("users", page.map(|u| u.profile()))
}

// =============================================================================
// Favorites
// =============================================================================

#[derive(Debug, Serialize)]
struct FavoritesView {
    pets: Vec<Pet>,
    products: Vec<Product>,
}

async fn get_favorites(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> ApiResult<Json<FavoritesView>> {
    let user = state.db.users().get(&subject.user_id).await?;
    let pets = state.db.pets().get_many(&user.favorites.pets).await?;
    let products = state.db.products().get_many(&user.favorites.products).await?;
    Ok(Json(FavoritesView { pets, products }))
}

async fn change_favorites(
    state: &AppState,
    user_id: &str,
    change: impl FnOnce(&mut Favorites) -> bool,
) -> ApiResult<Json<Value>> {
    let favorites = state.db.users().update_favorites(user_id, change).await?;
    Ok(Json(json!({ "favorites": favorites })))
}

async fn add_favorite_pet(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    check_id(&id, "Pet")?;
    state.db.pets().get(&id).await?;
    change_favorites(&state, &subject.user_id, |f| f.add_pet(&id)).await
}

async fn remove_favorite_pet(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    change_favorites(&state, &subject.user_id, |f| f.remove_pet(&id)).await
}

async fn add_favorite_product(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    check_id(&id, "Product")?;
    state.db.products().get(&id).await?;
    change_favorites(&state, &subject.user_id, |f| f.add_product(&id)).await
}

async fn remove_favorite_product(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    change_favorites(&state, &subject.user_id, |f| f.remove_product(&id)).await
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartRequest {
    product_id: String,
    #[serde(default = "one")]
    quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct SetQuantityRequest {
    quantity: i64,
}

/// Applies `change` to the caller's stored cart in one transaction.
async fn change_cart(
    state: &AppState,
    user_id: &str,
    change: impl FnOnce(&mut Cart) -> ApiResult<()>,
) -> ApiResult<Json<CartView>> {
    let cart = state.db.users().update_cart(user_id, change).await?;
    Ok(Json(CartView::from(&cart)))
}

async fn get_cart(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> ApiResult<Json<CartView>> {
    let user = state.db.users().get(&subject.user_id).await?;
    Ok(Json(CartView::from(&user.cart)))
}

async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> ApiResult<Json<CartView>> {
    check_id(&req.product_id, "Product")?;
    let product = state.db.products().get(&req.product_id).await?;

    change_cart(&state, &subject.user_id, |cart| {
        Ok(cart.add_item(&product.id, &product.name, product.price, req.quantity)?)
    })
    .await
}

async fn update_cart_item(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(product_id): Path<String>,
    ApiJson(req): ApiJson<SetQuantityRequest>,
) -> ApiResult<Json<CartView>> {
    change_cart(&state, &subject.user_id, |cart| {
        Ok(cart.set_quantity(&product_id, req.quantity)?)
    })
    .await
}

async fn remove_cart_item(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<CartView>> {
    change_cart(&state, &subject.user_id, |cart| {
        if cart.remove_item(&product_id) {
            Ok(())
        } else {
            Err(ApiError::not_found("Cart item"))
        }
    })
    .await
}

async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> ApiResult<Json<CartView>> {
    change_cart(&state, &subject.user_id, |cart| {
        cart.clear();
        Ok(())
    })
    .await
}
