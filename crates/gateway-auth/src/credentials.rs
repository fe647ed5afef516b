//! Email/password verification against the identity backend.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use gateway_core::types::Subject;
use gateway_rpc::ServiceProxy;
use gateway_rpc::command::identity;

/// Verifies credentials through the identity backend.
#[derive(Debug, Clone)]
pub struct CredentialAuthenticator {
    proxy: Arc<ServiceProxy>,
}

impl CredentialAuthenticator {
    /// Creates an authenticator that calls through `proxy`.
    pub fn new(proxy: Arc<ServiceProxy>) -> Self {
        Self { proxy }
    }

    /// Returns the sanitized subject for a valid email/password pair.
    ///
    /// Every failure collapses into `None`; callers decide how to report it.
    /// The returned subject never carries a secret field.
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<Subject> {
        let reply = match self
            .proxy
            .call(
                &identity::SIGN_IN,
                json!({ "email": email, "password": password }),
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                debug!(kind = %e.kind, error = %e.message, "Credential check failed");
                return None;
            }
        };

        match Subject::from_identity_reply(reply) {
            Ok(subject) => Some(subject),
            Err(e) => {
                warn!(error = %e, "Identity service returned an unusable subject");
                None
            }
        }
    }
}
