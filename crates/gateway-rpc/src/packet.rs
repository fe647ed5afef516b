//! Packets exchanged with backend services.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Outbound request. `id` correlates the eventual response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPacket {
    /// Correlation id.
    pub id: Uuid,
    /// Route string, see [`crate::Pattern::route`].
    pub pattern: String,
    /// Command payload, opaque to the proxy.
    pub data: Value,
}

/// Inbound response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePacket {
    /// Correlation id of the request this answers.
    pub id: Uuid,
    /// Handler result, when it returned normally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Handler failure, when it threw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Value>,
    /// Set on the final packet of a stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disposed: Option<bool>,
}

impl ResponsePacket {
    /// Whether this packet completes the call it belongs to.
    pub fn is_terminal(&self) -> bool {
        self.response.is_some() || self.err.is_some() || self.is_disposed.unwrap_or(false)
    }
}
