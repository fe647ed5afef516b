//! Integration tests for product and category routes.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use gateway_core::types::Role;
use helpers::{Reply, TestApp};

fn catalog(cmd: &str, data: &Value) -> Reply {
    match cmd {
        "ping" => Reply::Respond(json!("pong")),
        "create-product" => Reply::Respond(json!({"id": 11, "name": data["name"]})),
        "find-products-by-fields" => Reply::Respond(json!([{"id": 11, "name": "Rice"}])),
        "find-product-by-id" if data["id"] == 404 => {
            Reply::Respond(json!({"status": 404, "message": "Produto inexistente"}))
        }
        "find-product-by-id" => Reply::Respond(json!({"id": data["id"], "name": "Rice"})),
        "delete-category" => Reply::Respond(json!({
            "status": "error",
            "message": "Categoria possui produtos vinculados",
        })),
        _ => Reply::Silent,
    }
}

const PRODUCT_FIELDS: &[(&str, &str)] = &[
    ("name", "Rice"),
    ("sku", "RICE-5KG"),
    ("description", "Long grain"),
    ("price", "24.90"),
    ("category_id", "3"),
];

#[tokio::test]
async fn test_customer_cannot_create_product() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("1", Role::Customer);

    let res = app
        .multipart("POST", "/product", PRODUCT_FIELDS, None, Some(&token))
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "FORBIDDEN");
    assert!(app.backend.received_for("create-product").is_empty());
}

#[tokio::test]
async fn test_admin_creates_product_with_image() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("2", Role::Admin);

    let res = app
        .multipart(
            "POST",
            "/product",
            PRODUCT_FIELDS,
            Some(("rice.png", &b"\x89PNG"[..])),
            Some(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({"id": 11, "name": "Rice"}));

    let sent = app.backend.received_for("create-product");
    assert_eq!(sent.len(), 1);
    let payload = &sent[0];
    assert_eq!(payload["price"], json!(24.9));
    assert_eq!(payload["category_id"], json!(3));
    assert_eq!(payload["file"]["originalname"], "rice.png");
    assert_eq!(payload["file"]["mimetype"], "image/png");
    assert_eq!(payload["file"]["size"], 4);
    assert_eq!(payload["file"]["buffer"], "iVBORw==");
}

#[tokio::test]
async fn test_product_price_must_be_numeric() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("2", Role::Admin);

    let fields = [
        ("name", "Rice"),
        ("sku", "RICE-5KG"),
        ("description", "Long grain"),
        ("price", "cheap"),
    ];
    let res = app
        .multipart("POST", "/product", &fields, None, Some(&token))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customer_lists_products() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("1", Role::Customer);

    let res = app
        .request("GET", "/product?name=Rice", None, Some(&token))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([{"id": 11, "name": "Rice"}]));
    assert_eq!(
        app.backend.received_for("find-products-by-fields")[0]["name"],
        "Rice"
    );
}

#[tokio::test]
async fn test_listing_requires_session() {
    let app = TestApp::new(catalog).await;

    let res = app.request("GET", "/product", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_numeric_status_reply_is_backend_error() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("1", Role::Customer);

    let res = app.request("GET", "/product/404", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Produto inexistente");

    let res = app.request("GET", "/product/5", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], 5);
}

#[tokio::test]
async fn test_non_numeric_id_rejected() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("1", Role::Customer);

    let res = app.request("GET", "/product/abc", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.backend.received().is_empty());
}

#[tokio::test]
async fn test_error_marker_message_is_verbatim() {
    let app = TestApp::new(catalog).await;
    let token = app.token_for("2", Role::Admin);

    let res = app
        .request("DELETE", "/category/3", None, Some(&token))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "BACKEND_ERROR");
    assert_eq!(res.body["message"], "Categoria possui produtos vinculados");
}

#[tokio::test]
async fn test_catalog_ping_is_public() {
    let app = TestApp::new(catalog).await;

    let res = app.request("GET", "/product/ping", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "pong");
    assert!(res.body["duration"].is_u64());
}
