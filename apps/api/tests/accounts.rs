//! Registration, login, authorization failures and the error envelope.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{admin, login, register, server, server_with_db};

#[tokio::test]
async fn test_health() {
    let server = server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_register_then_login() {
    let server = server().await;
    let account = register(&server, "Alice", "buyer").await;

    let again = login(&server, "alice@pawmart.test", "secret123").await;
    assert_eq!(again.id, account.id);

    let profile = server
        .get("/api/users/profile")
        .authorization_bearer(&again.token)
        .await
        .json::<Value>();
    assert_eq!(profile["email"], "alice@pawmart.test");
    assert_eq!(profile["role"], "buyer");
    assert!(profile.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let server = server().await;
    register(&server, "Alice", "buyer").await;

    let response = server
        .post("/api/users/login")
        .json(&json!({ "email": "alice@pawmart.test", "password": "nope-nope" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let server = server().await;
    register(&server, "Alice", "buyer").await;

    let response = server
        .post("/api/users/register")
        .json(&json!({
            "name": "Other Alice",
            "email": "alice@pawmart.test",
            "password": "secret123",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "User already exists");
}

#[tokio::test]
async fn test_admin_role_cannot_be_self_registered() {
    let server = server().await;
    let response = server
        .post("/api/users/register")
        .json(&json!({
            "name": "Mallory",
            "email": "mallory@pawmart.test",
            "password": "secret123",
            "role": "admin",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["errors"][0]["field"], "role");
}

#[tokio::test]
async fn test_validation_reports_every_field() {
    let server = server().await;
    let response = server
        .post("/api/users/register")
        .json(&json!({ "name": "", "email": "not-an-email", "password": "123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let errors = response.json::<Value>()["errors"].as_array().unwrap().clone();
    let fields: Vec<&str> = errors.iter().filter_map(|e| e["field"].as_str()).collect();
    assert_eq!(fields, ["name", "email", "password"]);
}

#[tokio::test]
async fn test_missing_and_bad_tokens() {
    let server = server().await;

    let response = server.get("/api/users/profile").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Not authorized, no token");

    server
        .get("/api/users/profile")
        .authorization_bearer("not.a.jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_checks_are_forbidden() {
    let (server, db) = server_with_db().await;
    let buyer = register(&server, "Alice", "buyer").await;

    // Buyers cannot list pets for adoption or list users.
    server
        .post("/api/pets")
        .authorization_bearer(&buyer.token)
        .json(&json!({ "name": "Rex", "species": "dog", "age": 1 }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .get("/api/users")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin = admin(&server, &db).await;
    let response = server
        .get("/api/users")
        .authorization_bearer(&admin.token)
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_malformed_ids_are_not_found() {
    let server = server().await;

    let response = server.get("/api/pets/not-a-uuid").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "Pet not found");

    server
        .get("/api/pets/550e8400-e29b-41d4-a716-446655440000")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/products/42")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let server = server().await;
    let response = server
        .post("/api/users/login")
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"].is_string());
}

#[tokio::test]
async fn test_one_shop_per_seller() {
    let server = server().await;
    let seller = register(&server, "Sam", "seller").await;

    server
        .post("/api/shops")
        .authorization_bearer(&seller.token)
        .json(&json!({ "name": "First" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shops")
        .authorization_bearer(&seller.token)
        .json(&json!({ "name": "Second" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "You already have a shop");
}

#[tokio::test]
async fn test_cart_keeps_one_line_per_product() {
    let server = server().await;
    let (seller, _) = common::seller_with_shop(&server, "Sam").await;
    let buyer = register(&server, "Alice", "buyer").await;
    let kibble = common::create_product(&server, &seller, "Kibble", 2499, 10).await;

    for _ in 0..2 {
        server
            .post("/api/users/cart")
            .authorization_bearer(&buyer.token)
            .json(&json!({ "productId": kibble, "quantity": 2 }))
            .await
            .assert_status_ok();
    }

    let cart = server
        .get("/api/users/cart")
        .authorization_bearer(&buyer.token)
        .await
        .json::<Value>();
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 4);
}
