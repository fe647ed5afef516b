//! Integration tests for the service proxy over real TCP links.

mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Value, json};

use gateway_core::error::ErrorKind;
use gateway_core::types::Role;
use gateway_rpc::command::{Pattern, catalog};
use gateway_rpc::{RawReply, RetryPolicy, ServiceProxy, ServiceTag, TcpTransport, Transport, TransportError};
use helpers::{FakeBackend, Reply, TestApp};

fn proxy_to(port: u16) -> ServiceProxy {
    let transport = TcpTransport::new(
        ServiceTag::Catalog,
        format!("127.0.0.1:{port}"),
        Duration::from_millis(500),
    );
    ServiceProxy::new(RetryPolicy::none()).with_transport(ServiceTag::Catalog, Arc::new(transport))
}

fn echo(_cmd: &str, data: &Value) -> Reply {
    Reply::Respond(data.clone())
}

#[tokio::test]
async fn test_late_reply_is_discarded() {
    let backend = FakeBackend::start(|_cmd: &str, data: &Value| match data["n"].as_u64() {
        Some(1) => Reply::Delayed(Duration::from_millis(300), json!({"n": 1})),
        _ => Reply::Delayed(Duration::from_millis(400), json!({"n": 2})),
    })
    .await;
    let proxy = proxy_to(backend.addr.port());

    let started = Instant::now();
    let err = proxy
        .call_with_timeout(
            &catalog::FIND_PRODUCT_BY_ID,
            json!({"n": 1}),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendTimeout);
    assert!(started.elapsed() < Duration::from_millis(300));

    // The reply to the first call lands while this one is still waiting.
    let reply = proxy
        .call(&catalog::FIND_PRODUCT_BY_ID, json!({"n": 2}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"n": 2}));
}

#[tokio::test]
async fn test_concurrent_calls_are_correlated() {
    // Later requests are answered first.
    let backend = FakeBackend::start(|_cmd: &str, data: &Value| {
        let n = data["n"].as_u64().unwrap_or(0);
        Reply::Delayed(Duration::from_millis(5 * (20 - n)), data.clone())
    })
    .await;
    let proxy = Arc::new(proxy_to(backend.addr.port()));

    let calls = (0..20u64).map(|n| {
        let proxy = Arc::clone(&proxy);
        async move {
            let reply = proxy
                .call(&catalog::FIND_PRODUCT_BY_ID, json!({"n": n}))
                .await
                .unwrap();
            (n, reply)
        }
    });

    for (n, reply) in join_all(calls).await {
        assert_eq!(reply, json!({"n": n}));
    }
    assert_eq!(backend.received().len(), 20);
}

#[tokio::test]
async fn test_dropped_connection_fails_in_flight_call() {
    let backend = FakeBackend::start(|_cmd: &str, data: &Value| {
        if data["drop"] == true {
            Reply::Disconnect
        } else {
            Reply::Respond(json!({"ok": true}))
        }
    })
    .await;
    let proxy = proxy_to(backend.addr.port());

    let err = proxy
        .call(&catalog::FIND_PRODUCT_BY_ID, json!({"drop": true}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);

    // The next call dials a fresh link; the dropped request is not re-sent.
    let reply = proxy
        .call(&catalog::FIND_PRODUCT_BY_ID, json!({"drop": false}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"ok": true}));
    assert_eq!(backend.received_for("find-product-by-id").len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend() {
    let proxy = proxy_to(helpers::unused_port().await);

    let err = proxy
        .call(&catalog::FIND_PRODUCT_BY_ID, json!({"id": 1}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);

    let failures = proxy.warm_up().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, ServiceTag::Catalog);
}

#[tokio::test]
async fn test_warm_up_connects() {
    let backend = FakeBackend::start(echo).await;
    let proxy = proxy_to(backend.addr.port());

    assert!(proxy.warm_up().await.is_empty());
    let reply = proxy
        .call(&catalog::FIND_PRODUCT_BY_ID, json!({"id": 3}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"id": 3}));
}

#[tokio::test]
async fn test_err_field_is_backend_error() {
    let backend =
        FakeBackend::start(|_cmd: &str, _data: &Value| Reply::Fail(json!("Estoque insuficiente")))
            .await;
    let proxy = proxy_to(backend.addr.port());

    let err = proxy
        .call(&catalog::UPDATE_PRODUCT, json!({"id": 3}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendError);
    assert_eq!(err.message, "Estoque insuficiente");
}

#[tokio::test]
async fn test_silent_backend_maps_to_gateway_timeout() {
    let app = TestApp::new(|_cmd: &str, _data: &Value| Reply::Silent).await;
    let token = app.token_for("1", Role::Customer);

    let started = Instant::now();
    let res = app.request("GET", "/user/1", None, Some(&token)).await;

    assert_eq!(res.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(res.body["error"], "BACKEND_TIMEOUT");
    assert!(started.elapsed() >= Duration::from_millis(2_000));
}

/// A backend whose link never comes up, like a host that drops SYNs.
#[derive(Debug)]
struct Blackholed;

#[async_trait]
impl Transport for Blackholed {
    async fn send(&self, _: &Pattern, _: Value) -> Result<RawReply, TransportError> {
        panic!("nothing may be sent before the link is up");
    }

    async fn warm_up(&self) -> Result<(), TransportError> {
        futures::future::pending().await
    }
}

#[tokio::test]
async fn test_blackholed_backend_is_unavailable_over_http() {
    let app = TestApp::with_proxy(echo, |proxy| {
        proxy.with_transport(ServiceTag::Ordering, Arc::new(Blackholed))
    })
    .await;
    let token = app.token_for("5", Role::Customer);

    let started = Instant::now();
    let res = app.request("GET", "/order", None, Some(&token)).await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["error"], "BACKEND_UNAVAILABLE");
    assert!(started.elapsed() < Duration::from_secs(2));
}
