//! Notifier that writes reset notices to the log.

use async_trait::async_trait;
use tracing::{debug, info};

use gateway_core::result::AppResult;
use gateway_core::traits::{Notifier, ResetNotice};

/// Logs reset notices instead of delivering them.
///
/// Stands in for a mail channel; the link is only logged at debug level.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_password_reset(&self, notice: ResetNotice) -> AppResult<()> {
        info!(email = %notice.email, first_name = %notice.first_name, "Password reset notice queued");
        debug!(reset_url = %notice.reset_url, "Password reset link");
        Ok(())
    }
}
