//! Outbound notification seam used by the password-reset flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Everything a delivery channel needs to send a password-reset message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetNotice {
    /// Recipient address.
    pub email: String,
    /// Greeting name.
    pub first_name: String,
    /// Link carrying the freshly issued token.
    pub reset_url: String,
}

/// Delivers reset notices (email, queue, log; the core does not care which).
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    /// Hand a reset notice to the delivery channel.
    async fn send_password_reset(&self, notice: ResetNotice) -> AppResult<()>;
}
