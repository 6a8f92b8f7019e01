//! Rescue operations over HTTP, mostly donations.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{register, server, Account};

async fn create_rescue(server: &axum_test::TestServer, ngo: &Account) -> String {
    let response = server
        .post("/api/rescues")
        .authorization_bearer(&ngo.token)
        .json(&json!({
            "title": "Flood relief",
            "location": { "city": "Lahore", "country": "Pakistan" },
            "fundingRequired": 100000,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_anonymous_donation_hides_donor() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let donor = register(&server, "Alice", "buyer").await;
    let rescue = create_rescue(&server, &ngo).await;

    // Even with a token, an anonymous donation records no donor.
    let response = server
        .post(&format!("/api/rescues/{rescue}/donate"))
        .authorization_bearer(&donor.token)
        .json(&json!({
            "amount": 50,
            "anonymous": true,
            "anonymousDonor": { "name": "A friend" },
        }))
        .await;
    response.assert_status_ok();

    let funding = response.json::<Value>();
    assert_eq!(funding["raised"], 50);
    let donation = &funding["donations"][0];
    assert!(donation.get("donor").map_or(true, Value::is_null));
    assert_eq!(donation["anonymousDonor"]["name"], "A friend");
}

#[tokio::test]
async fn test_anonymous_donation_needs_a_name() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let rescue = create_rescue(&server, &ngo).await;

    let response = server
        .post(&format!("/api/rescues/{rescue}/donate"))
        .json(&json!({ "amount": 50, "anonymous": true }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["errors"][0]["field"],
        "anonymousDonor.name"
    );
}

#[tokio::test]
async fn test_named_donation_requires_login() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let rescue = create_rescue(&server, &ngo).await;

    server
        .post(&format!("/api/rescues/{rescue}/donate"))
        .json(&json!({ "amount": 50 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_raised_is_the_sum_of_donations() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let donor = register(&server, "Alice", "buyer").await;
    let rescue = create_rescue(&server, &ngo).await;

    for amount in [1000, 2500, 75] {
        server
            .post(&format!("/api/rescues/{rescue}/donate"))
            .authorization_bearer(&donor.token)
            .json(&json!({ "amount": amount, "message": "Good luck" }))
            .await
            .assert_status_ok();
    }

    let rescue = server
        .get(&format!("/api/rescues/{rescue}"))
        .await
        .json::<Value>();
    assert_eq!(rescue["funding"]["raised"], 3575);
    assert_eq!(rescue["funding"]["required"], 100000);
    assert_eq!(rescue["funding"]["donations"].as_array().unwrap().len(), 3);
    assert_eq!(rescue["funding"]["donations"][0]["donor"], donor.id.as_str());
}

#[tokio::test]
async fn test_non_positive_donation_is_rejected() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let donor = register(&server, "Alice", "buyer").await;
    let rescue = create_rescue(&server, &ngo).await;

    server
        .post(&format!("/api/rescues/{rescue}/donate"))
        .authorization_bearer(&donor.token)
        .json(&json!({ "amount": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_and_team_management() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let volunteer = register(&server, "Vera", "buyer").await;
    let outsider = register(&server, "Otto", "buyer").await;
    let rescue = create_rescue(&server, &ngo).await;

    let response = server
        .put(&format!("/api/rescues/{rescue}/status"))
        .authorization_bearer(&ngo.token)
        .json(&json!({ "status": "in_progress" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "in_progress");

    server
        .put(&format!("/api/rescues/{rescue}/status"))
        .authorization_bearer(&outsider.token)
        .json(&json!({ "status": "completed" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post(&format!("/api/rescues/{rescue}/team"))
        .authorization_bearer(&ngo.token)
        .json(&json!({ "members": [{ "member": volunteer.id, "role": "driver" }] }))
        .await
        .assert_status_ok();

    // Team members may post updates; outsiders may not.
    server
        .post(&format!("/api/rescues/{rescue}/updates"))
        .authorization_bearer(&volunteer.token)
        .json(&json!({ "content": "Reached the site" }))
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/rescues/{rescue}/updates"))
        .authorization_bearer(&outsider.token)
        .json(&json!({ "content": "Hi" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_outcomes_merge_field_by_field() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let outsider = register(&server, "Otto", "buyer").await;
    let rescue = create_rescue(&server, &ngo).await;
    let path = format!("/api/rescues/{rescue}/outcomes");

    server
        .put(&path)
        .authorization_bearer(&ngo.token)
        .json(&json!({ "animalsRescued": 12, "summary": "Twelve dogs out" }))
        .await
        .assert_status_ok();

    let response = server
        .put(&path)
        .authorization_bearer(&ngo.token)
        .json(&json!({ "animalsTreated": 9, "summary": "Twelve dogs, nine treated" }))
        .await;
    response.assert_status_ok();

    let outcomes = &response.json::<Value>()["outcomes"];
    assert_eq!(outcomes["animalsRescued"], 12);
    assert_eq!(outcomes["animalsTreated"], 9);
    assert_eq!(outcomes["summary"], "Twelve dogs, nine treated");

    server
        .put(&path)
        .authorization_bearer(&outsider.token)
        .json(&json!({ "animalsAdopted": 1 }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_donation_ceiling() {
    let server = server().await;
    let ngo = register(&server, "Helpers", "ngo").await;
    let donor = register(&server, "Alice", "buyer").await;
    let rescue = create_rescue(&server, &ngo).await;
    let donate = |amount: i64| {
        server
            .post(&format!("/api/rescues/{rescue}/donate"))
            .authorization_bearer(&donor.token)
            .json(&json!({ "amount": amount }))
    };

    donate(pawmart_core::MAX_AMOUNT_CENTS + 1)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    donate(i64::MAX).await.assert_status(StatusCode::BAD_REQUEST);
    donate(pawmart_core::MAX_AMOUNT_CENTS).await.assert_status_ok();

    let stored = server
        .get(&format!("/api/rescues/{rescue}"))
        .await
        .json::<Value>();
    assert_eq!(stored["funding"]["raised"], pawmart_core::MAX_AMOUNT_CENTS);
    assert_eq!(stored["funding"]["donations"].as_array().unwrap().len(), 1);
}
