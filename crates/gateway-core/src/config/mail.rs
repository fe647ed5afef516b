//! Reset-link configuration.

use serde::{Deserialize, Serialize};

/// Settings used to build links handed to the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Public base URL of the storefront, e.g. `https://shop.example.com`.
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            app_url: default_app_url(),
        }
    }
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}
