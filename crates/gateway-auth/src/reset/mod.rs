//! Password-reset flow.
//!
//! Looks the subject up by email, issues a fresh token for it, and hands a
//! reset link to the configured [`Notifier`]. A lookup failure propagates
//! unchanged, so callers can tell whether an email is registered.

pub mod notifier;

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use gateway_core::config::MailConfig;
use gateway_core::error::AppError;
use gateway_core::traits::{Notifier, ResetNotice};
use gateway_core::types::Subject;
use gateway_rpc::ServiceProxy;
use gateway_rpc::command::identity;

use crate::jwt::TokenIssuer;

pub use notifier::TracingNotifier;

/// Path on the storefront that consumes reset tokens.
const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

/// Drives the forgot-password flow.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    proxy: Arc<ServiceProxy>,
    issuer: TokenIssuer,
    notifier: Arc<dyn Notifier>,
    app_url: String,
}

impl PasswordReset {
    /// Creates the flow.
    pub fn new(
        proxy: Arc<ServiceProxy>,
        issuer: TokenIssuer,
        notifier: Arc<dyn Notifier>,
        mail: &MailConfig,
    ) -> Self {
        Self {
            proxy,
            issuer,
            notifier,
            app_url: mail.app_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sends a reset link to the subject registered under `email`.
    pub async fn request(&self, email: &str) -> Result<(), AppError> {
        let reply = self
            .proxy
            .call(&identity::FIND_BY_EMAIL, json!({ "email": email }))
            .await?;
        let subject = Subject::from_identity_reply(reply)?;
        let issued = self.issuer.issue(&subject)?;

        let notice = ResetNotice {
            email: subject.email.clone(),
            first_name: subject.first_name.clone(),
            reset_url: self.reset_url(&issued.token),
        };
        self.notifier.send_password_reset(notice).await?;

        info!(user_id = %subject.id, "Password reset requested");
        Ok(())
    }

    fn reset_url(&self, token: &str) -> String {
        format!("{}{}?token={}", self.app_url, CHANGE_PASSWORD_PATH, token)
    }
}
