//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use pawmart_api::{router, ApiConfig, AppState};
use pawmart_core::types::{Role, User};
use pawmart_db::password::hash_password;
use pawmart_db::{Database, DbConfig};

/// A registered account.
pub struct Account {
    pub id: String,
    pub token: String,
}

/// Spins up the full router over a fresh in-memory database.
pub async fn server() -> TestServer {
    server_with_db().await.0
}

/// Like [`server`], also handing back the database for direct setup.
pub async fn server_with_db() -> (TestServer, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ApiConfig {
        database_path: ":memory:".to_string(),
        ..Default::default()
    };
    let state = AppState::new(db.clone(), config);
    (TestServer::new(router(state)), db)
}

/// Admins cannot self-register; insert one and log in.
pub async fn admin(server: &TestServer, db: &Database) -> Account {
    let user = User::new(
        "Admin",
        "admin@pawmart.test",
        hash_password("secret123").unwrap(),
        Role::Admin,
    );
    db.users().create(&user).await.unwrap();
    login(server, "admin@pawmart.test", "secret123").await
}

pub async fn register(server: &TestServer, name: &str, role: &str) -> Account {
    let response = server
        .post("/api/users/register")
        .json(&json!({
            "name": name,
            "email": format!("{}@pawmart.test", name.to_lowercase()),
            "password": "secret123",
            "role": role,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    Account {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> Account {
    let response = server
        .post("/api/users/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    Account {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

pub async fn create_pet(server: &TestServer, provider: &Account, name: &str) -> Value {
    let response = server
        .post("/api/pets")
        .authorization_bearer(&provider.token)
        .json(&json!({
            "name": name,
            "species": "dog",
            "breed": "Mixed",
            "age": 2,
            "adoptionFee": 5000,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn get_pet(server: &TestServer, id: &str) -> Value {
    let response = server.get(&format!("/api/pets/{id}")).await;
    response.assert_status_ok();
    response.json::<Value>()
}

/// Registers a seller and opens their shop. Returns (seller, shop id).
pub async fn seller_with_shop(server: &TestServer, name: &str) -> (Account, String) {
    let seller = register(server, name, "seller").await;
    let response = server
        .post("/api/shops")
        .authorization_bearer(&seller.token)
        .json(&json!({ "name": format!("{name}'s Pet Supplies") }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let shop = response.json::<Value>()["id"].as_str().unwrap().to_string();
    (seller, shop)
}

pub async fn create_product(
    server: &TestServer,
    seller: &Account,
    name: &str,
    price: i64,
    stock: i64,
) -> String {
    let response = server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .json(&json!({
            "name": name,
            "category": "food",
            "price": price,
            "stock": stock,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

pub async fn product_stock(server: &TestServer, id: &str) -> i64 {
    let response = server.get(&format!("/api/products/{id}")).await;
    response.assert_status_ok();
    response.json::<Value>()["stock"].as_i64().unwrap()
}

/// Hires an employee into the seller's shop and logs them in.
pub async fn hire(server: &TestServer, seller: &Account, name: &str, permissions: Value) -> Account {
    let email = format!("{}@staff.pawmart.test", name.to_lowercase());
    server
        .post("/api/employees")
        .authorization_bearer(&seller.token)
        .json(&json!({
            "name": name,
            "email": email,
            "password": "secret123",
            "position": "Clerk",
            "permissions": permissions,
        }))
        .await
        .assert_status(StatusCode::CREATED);

    login(server, &email, "secret123").await
}
