//! Integration tests for login, profile and password reset.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use gateway_core::types::Role;
use helpers::{Reply, TestApp};

fn identity(cmd: &str, data: &Value) -> Reply {
    match cmd {
        "sign-in" if data["password"] == "s3cret" => Reply::Respond(json!({
            "id": 7,
            "email": data["email"],
            "firstName": "Ana",
            "role": "customer",
            "password": "$2b$10$hash",
        })),
        "sign-in" => Reply::Respond(json!({"message": "Invalid credentials"})),
        "find-by-email" if data["email"] == "ana@example.com" => Reply::Respond(json!({
            "id": 7,
            "email": "ana@example.com",
            "firstName": "Ana",
            "role": "customer",
        })),
        "find-by-email" => Reply::Respond(json!({"message": "User not found."})),
        _ => Reply::Silent,
    }
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new(identity).await;

    let res = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({"email": "ana@example.com", "password": "s3cret"})),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user_id"], "7");
    let token = res.body["access_token"].as_str().unwrap().to_string();

    let profile = app.request("GET", "/profile", None, Some(&token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["userId"], "7");
    assert_eq!(profile.body["email"], "ana@example.com");
    assert_eq!(profile.body["firstName"], "Ana");
    assert_eq!(profile.body["role"], "customer");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new(identity).await;

    let res = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({"email": "ana@example.com", "password": "nope"})),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "UNAUTHENTICATED");
    assert_eq!(res.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_invalid_body() {
    let app = TestApp::new(identity).await;

    let res = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({"email": "not-an-email", "password": "s3cret"})),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
    assert!(app.backend.received_for("sign-in").is_empty());
}

#[tokio::test]
async fn test_login_with_identity_down() {
    let dead = helpers::unused_port().await;
    let app = TestApp::with_config(identity, |config| {
        config.services.identity.port = dead;
    })
    .await;

    let res = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({"email": "ana@example.com", "password": "s3cret"})),
            None,
        )
        .await;

    // An unreachable identity backend is indistinguishable from bad credentials.
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new(identity).await;

    let res = app.request("GET", "/profile", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Missing bearer token");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = TestApp::new(identity).await;

    let res = app
        .request("GET", "/profile", None, Some("invalid-token"))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let token = app.token_for("7", Role::Customer);
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{unsigned}.{flipped}{}", &signature[1..]);
    let res = app.request("GET", "/profile", None, Some(&tampered)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_sends_notice() {
    let app = TestApp::new(identity).await;

    let res = app
        .request(
            "POST",
            "/auth/forgot-password",
            Some(json!({"email": "ana@example.com"})),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let sent = app.outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "ana@example.com");
    assert_eq!(sent[0].first_name, "Ana");

    let token = sent[0]
        .reset_url
        .strip_prefix("https://shop.test/auth/change-password?token=")
        .expect("reset url carries the token")
        .to_string();
    let profile = app.request("GET", "/profile", None, Some(&token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["userId"], "7");
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let app = TestApp::new(identity).await;

    let res = app
        .request(
            "POST",
            "/auth/forgot-password",
            Some(json!({"email": "ghost@example.com"})),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "BACKEND_ERROR");
    assert_eq!(res.body["message"], "User not found.");
    assert!(app.outbox.sent().is_empty());
}
