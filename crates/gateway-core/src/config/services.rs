//! Backend service bindings.

use serde::{Deserialize, Serialize};

/// Host/port bindings for every backend service plus link-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Identity (user) service.
    #[serde(default = "default_identity")]
    pub identity: EndpointConfig,
    /// Catalog (product + category) service.
    #[serde(default = "default_catalog")]
    pub catalog: EndpointConfig,
    /// Ordering service.
    #[serde(default = "default_ordering")]
    pub ordering: EndpointConfig,
    /// Upper bound for establishing a backend connection, in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Reconnect policy for calls whose connection could not be established.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ServicesConfig {
    /// Returns every configured endpoint with its section name.
    pub fn endpoints(&self) -> [(&'static str, &EndpointConfig); 3] {
        [
            ("identity", &self.identity),
            ("catalog", &self.catalog),
            ("ordering", &self.ordering),
        ]
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            identity: default_identity(),
            catalog: default_catalog(),
            ordering: default_ordering(),
            connect_timeout_ms: default_connect_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

/// A single backend binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl EndpointConfig {
    /// Returns `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bounded retry applied only when the backend link cannot be established.
///
/// Calls that reached the backend are never re-sent: a timeout does not
/// prove the backend skipped the effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional connection attempts after the first (0 disables retry).
    #[serde(default)]
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds.
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            backoff_ms: default_backoff(),
        }
    }
}

fn default_identity() -> EndpointConfig {
    EndpointConfig {
        host: "127.0.0.1".to_string(),
        port: 3001,
    }
}

fn default_catalog() -> EndpointConfig {
    EndpointConfig {
        host: "127.0.0.1".to_string(),
        port: 3002,
    }
}

fn default_ordering() -> EndpointConfig {
    EndpointConfig {
        host: "127.0.0.1".to_string(),
        port: 3003,
    }
}

fn default_connect_timeout() -> u64 {
    1500
}

fn default_backoff() -> u64 {
    200
}
