//! Integration tests for order routes.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use gateway_core::types::Role;
use helpers::{Reply, TestApp};

fn ordering(cmd: &str, data: &Value) -> Reply {
    match cmd {
        "create-order" => Reply::Respond(json!({"id": 90, "customer_id": data["customer_id"]})),
        "find-orders-by-fields" => Reply::Respond(json!([{"id": 90}])),
        "update-order-status" => Reply::Respond(json!({"id": data["id"], "status": data["status"]})),
        _ => Reply::Silent,
    }
}

#[tokio::test]
async fn test_customer_sees_only_own_orders() {
    let app = TestApp::new(ordering).await;
    let token = app.token_for("42", Role::Customer);

    let res = app.request("GET", "/order", None, Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([{"id": 90}]));
    assert_eq!(
        app.backend.received_for("find-orders-by-fields"),
        vec![json!({"user_id": "42"})]
    );
}

#[tokio::test]
async fn test_admin_sees_all_orders() {
    let app = TestApp::new(ordering).await;
    let token = app.token_for("1", Role::Admin);

    let res = app.request("GET", "/order", None, Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        app.backend.received_for("find-orders-by-fields"),
        vec![json!({})]
    );
}

#[tokio::test]
async fn test_create_order() {
    let app = TestApp::new(ordering).await;
    let token = app.token_for("42", Role::Customer);

    let res = app
        .request(
            "POST",
            "/order",
            Some(json!({"customer_id": 42})),
            Some(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({"id": 90, "customer_id": 42}));
}

#[tokio::test]
async fn test_update_order_status_requires_status() {
    let app = TestApp::new(ordering).await;
    let token = app.token_for("42", Role::Customer);

    let res = app
        .request("PATCH", "/order/90", Some(json!({"status": ""})), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            "PATCH",
            "/order/90",
            Some(json!({"status": "SHIPPED"})),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({"id": 90, "status": "SHIPPED"}));
}

#[tokio::test]
async fn test_ordering_down_is_unavailable() {
    let dead = helpers::unused_port().await;
    let app = TestApp::with_config(ordering, |config| {
        config.services.ordering.port = dead;
    })
    .await;
    let token = app.token_for("42", Role::Customer);

    let res = app.request("GET", "/order", None, Some(&token)).await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["error"], "BACKEND_UNAVAILABLE");
}
