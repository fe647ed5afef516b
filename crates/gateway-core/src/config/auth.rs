//! Token signing configuration.

use serde::{Deserialize, Serialize};

/// Bearer token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). No default; must be supplied.
    #[serde(default)]
    pub jwt_secret: String,
    /// Signer default token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Clock-skew leeway applied when checking expiry.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_seconds: default_token_ttl(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_leeway() -> u64 {
    5
}
