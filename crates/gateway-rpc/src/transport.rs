//! Transport seam between the proxy and the wire.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use gateway_core::error::{AppError, ErrorKind};

use crate::command::{Pattern, ServiceTag};
use crate::connection::Connection;
use crate::packet::ResponsePacket;

/// Unclassified reply, exactly as the backend sent it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReply {
    /// Handler result, if any.
    pub response: Option<Value>,
    /// Handler failure, if any.
    pub err: Option<Value>,
}

impl From<ResponsePacket> for RawReply {
    fn from(packet: ResponsePacket) -> Self {
        Self {
            response: packet.response,
            err: packet.err,
        }
    }
}

/// Link-level failures. All surface to callers as `BackendUnavailable`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The link could not be established; the request was never sent.
    #[error("could not reach {service} at {address}: {reason}")]
    Connect {
        /// Target service.
        service: ServiceTag,
        /// Dialed address.
        address: String,
        /// Underlying cause.
        reason: String,
    },
    /// Establishing the link took longer than allowed; nothing was sent.
    #[error("connecting to {service} did not finish within {after_ms} ms")]
    DialTimeout {
        /// Target service.
        service: ServiceTag,
        /// Bound that elapsed.
        after_ms: u64,
    },
    /// The link closed; the request may already have been delivered.
    #[error("connection to {service} lost: {reason}")]
    Closed {
        /// Target service.
        service: ServiceTag,
        /// Underlying cause.
        reason: String,
    },
    /// No transport is bound for the service.
    #[error("no transport configured for {0}")]
    Unbound(ServiceTag),
}

impl TransportError {
    /// Whether re-sending cannot double-apply the command.
    pub fn is_safe_to_retry(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::DialTimeout { .. })
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorKind::BackendUnavailable, message, err)
    }
}

/// Delivers one request to a backend and returns its correlated reply.
///
/// Implementations must never hand a caller a reply belonging to another
/// request. They need not bound the wait; the proxy does.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug + 'static {
    /// Send `data` routed by `pattern` and wait for the matching reply.
    async fn send(&self, pattern: &Pattern, data: Value) -> Result<RawReply, TransportError>;

    /// Establish the link if it is not up. The proxy calls this before
    /// every send, outside the reply bound.
    async fn warm_up(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// TCP transport holding one shared connection per backend.
///
/// The connection is dialed on first use. When it drops, in-flight calls
/// fail and the next call dials again; nothing is re-sent.
#[derive(Debug)]
pub struct TcpTransport {
    service: ServiceTag,
    address: String,
    connect_timeout: Duration,
    connection: Mutex<Option<Arc<Connection>>>,
}

impl TcpTransport {
    /// Creates a transport for `service` at `address` (`host:port`).
    pub fn new(service: ServiceTag, address: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            service,
            address: address.into(),
            connect_timeout,
            connection: Mutex::new(None),
        }
    }

    /// Returns the live connection, dialing if there is none.
    ///
    /// The slot lock covers only the dial, never a reply wait.
    async fn connection(&self) -> Result<Arc<Connection>, TransportError> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            if conn.is_open() {
                return Ok(Arc::clone(conn));
            }
            info!(service = %self.service, "Discarding closed backend connection");
        }

        let conn = Arc::new(
            Connection::connect(self.service, &self.address, self.connect_timeout).await?,
        );
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, pattern: &Pattern, data: Value) -> Result<RawReply, TransportError> {
        let conn = self.connection().await?;
        conn.request(pattern.route(), data).await
    }

    async fn warm_up(&self) -> Result<(), TransportError> {
        self.connection().await.map(|_| ())
    }
}
