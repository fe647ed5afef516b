//! Shared test helpers for integration tests.
//!
//! `FakeBackend` speaks the backend frame protocol on an ephemeral port and
//! answers according to a closure; `TestApp` wires the real router to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tower::ServiceExt;

use gateway_api::{AppState, build_router};
use gateway_auth::jwt::TokenIssuer;
use gateway_core::config::AppConfig;
use gateway_core::result::AppResult;
use gateway_core::traits::{Notifier, ResetNotice};
use gateway_core::types::{Role, Subject};
use gateway_rpc::ServiceProxy;
use gateway_rpc::codec::PacketCodec;
use gateway_rpc::packet::{RequestPacket, ResponsePacket};

/// Signing secret used by every test app.
pub const SECRET: &str = "integration-test-secret";

/// How the fake backend answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer immediately with `response`.
    Respond(Value),
    /// Answer immediately with `err`.
    Fail(Value),
    /// Answer with `response` after a delay.
    Delayed(Duration, Value),
    /// Never answer.
    Silent,
    /// Drop the connection.
    Disconnect,
}

type Handler = Arc<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

/// A backend service on `127.0.0.1` driven by a closure.
pub struct FakeBackend {
    /// Listening address.
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<(String, Value)>>>,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Starts listening; `handler` receives `(cmd, data)` for every request.
    pub async fn start(handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static) -> Self {
        let handler: Handler = Arc::new(handler);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("No local address");
        let received = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let received = Arc::clone(&received);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, Arc::clone(&handler), Arc::clone(&received)));
                }
            })
        };

        Self {
            addr,
            received,
            task,
        }
    }

    /// Every `(cmd, data)` received so far, in arrival order.
    pub fn received(&self) -> Vec<(String, Value)> {
        self.received.lock().unwrap().clone()
    }

    /// Payloads received for `cmd`.
    pub fn received_for(&self, cmd: &str) -> Vec<Value> {
        self.received()
            .into_iter()
            .filter(|(c, _)| c == cmd)
            .map(|(_, data)| data)
            .collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(stream: TcpStream, handler: Handler, received: Arc<Mutex<Vec<(String, Value)>>>) {
    let (mut sink, mut frames) = Framed::new(stream, PacketCodec::<RequestPacket>::new()).split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ResponsePacket>();
    let writer = tokio::spawn(async move {
        while let Some(packet) = rx.recv().await {
            if sink.send(packet).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(request)) = frames.next().await {
        let route: Value = serde_json::from_str(&request.pattern).unwrap_or(Value::Null);
        let cmd = route["cmd"].as_str().unwrap_or_default().to_string();
        received
            .lock()
            .unwrap()
            .push((cmd.clone(), request.data.clone()));

        let id = request.id;
        match handler(&cmd, &request.data) {
            Reply::Respond(value) => {
                let _ = tx.send(response(id, value));
            }
            Reply::Fail(err) => {
                let _ = tx.send(ResponsePacket {
                    id,
                    err: Some(err),
                    is_disposed: Some(true),
                    ..ResponsePacket::default()
                });
            }
            Reply::Delayed(delay, value) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(response(id, value));
                });
            }
            Reply::Silent => {}
            Reply::Disconnect => break,
        }
    }

    writer.abort();
}

fn response(id: uuid::Uuid, value: Value) -> ResponsePacket {
    ResponsePacket {
        id,
        response: Some(value),
        err: None,
        is_disposed: Some(true),
    }
}

/// A port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    listener.local_addr().expect("No local address").port()
}

/// Notifier that keeps every notice it is handed.
#[derive(Debug, Default)]
pub struct Outbox(Mutex<Vec<ResetNotice>>);

impl Outbox {
    /// Notices sent so far.
    pub fn sent(&self) -> Vec<ResetNotice> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send_password_reset(&self, notice: ResetNotice) -> AppResult<()> {
        self.0.lock().unwrap().push(notice);
        Ok(())
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Backend behind every service tag
    pub backend: FakeBackend,
    /// Reset notices handed to the notifier
    pub outbox: Arc<Outbox>,
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Parsed JSON body, or `Null` when the body is not JSON.
    pub body: Value,
}

impl TestApp {
    /// Creates an app whose three services all point at one fake backend.
    pub async fn new(handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static) -> Self {
        Self::with_config(handler, |_| {}).await
    }

    /// Like [`TestApp::new`], with a chance to adjust the config first.
    pub async fn with_config(
        handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static,
        tweak: impl FnOnce(&mut AppConfig),
    ) -> Self {
        Self::build(handler, tweak, |proxy| proxy).await
    }

    /// Like [`TestApp::new`], with a chance to rebind transports on the proxy.
    pub async fn with_proxy(
        handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static,
        rebind: impl FnOnce(ServiceProxy) -> ServiceProxy,
    ) -> Self {
        Self::build(handler, |_| {}, rebind).await
    }

    async fn build(
        handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static,
        tweak: impl FnOnce(&mut AppConfig),
        rebind: impl FnOnce(ServiceProxy) -> ServiceProxy,
    ) -> Self {
        let backend = FakeBackend::start(handler).await;

        let mut config = AppConfig::default();
        config.auth.jwt_secret = SECRET.to_string();
        config.mail.app_url = "https://shop.test".to_string();
        config.services.connect_timeout_ms = 500;
        for endpoint in [
            &mut config.services.identity,
            &mut config.services.catalog,
            &mut config.services.ordering,
        ] {
            endpoint.host = "127.0.0.1".to_string();
            endpoint.port = backend.addr.port();
        }
        tweak(&mut config);

        let proxy = Arc::new(rebind(ServiceProxy::from_config(&config.services)));
        let outbox = Arc::new(Outbox::default());
        let state = AppState::new(config.clone(), proxy, outbox.clone());

        Self {
            router: build_router(state),
            config,
            backend,
            outbox,
        }
    }

    /// Issues a token the way login would.
    pub fn token_for(&self, id: &str, role: Role) -> String {
        let subject = Subject {
            id: id.to_string(),
            email: format!("user{id}@example.com"),
            first_name: format!("User{id}"),
            role,
            attributes: Map::new(),
        };
        TokenIssuer::new(&self.config.auth)
            .issue(&subject)
            .expect("Failed to issue token")
            .token
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body = body
            .map(|b| serde_json::to_vec(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.send(method, path, "application/json", body, token).await
    }

    /// Make a multipart request with text fields and an optional `image` part.
    pub async fn multipart(
        &self,
        method: &str,
        path: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
        token: Option<&str>,
    ) -> TestResponse {
        const BOUNDARY: &str = "gateway-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        self.send(method, path, &content_type, body, token).await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}
