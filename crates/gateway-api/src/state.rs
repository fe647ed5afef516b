//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use gateway_auth::credentials::CredentialAuthenticator;
use gateway_auth::jwt::{SessionAuthenticator, TokenIssuer};
use gateway_auth::rbac::RoleAuthorizer;
use gateway_auth::reset::PasswordReset;
use gateway_auth::session::LoginService;
use gateway_core::config::AppConfig;
use gateway_core::traits::Notifier;
use gateway_rpc::ServiceProxy;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Backends ─────────────────────────────────────────────
    /// Service proxy shared by every handler
    pub proxy: Arc<ServiceProxy>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token verifier
    pub session_authenticator: Arc<SessionAuthenticator>,
    /// Role authorizer with the operation policy table
    pub authorizer: Arc<RoleAuthorizer>,
    /// Credential check plus token issuance
    pub login: Arc<LoginService>,
    /// Forgot-password flow
    pub password_reset: Arc<PasswordReset>,
}

impl AppState {
    /// Wires every service from configuration, a proxy, and a notifier.
    pub fn new(config: AppConfig, proxy: Arc<ServiceProxy>, notifier: Arc<dyn Notifier>) -> Self {
        let issuer = TokenIssuer::new(&config.auth);
        let login = LoginService::new(
            CredentialAuthenticator::new(Arc::clone(&proxy)),
            issuer.clone(),
        );
        let password_reset =
            PasswordReset::new(Arc::clone(&proxy), issuer, notifier, &config.mail);

        Self {
            session_authenticator: Arc::new(SessionAuthenticator::new(&config.auth)),
            authorizer: Arc::new(RoleAuthorizer::new()),
            login: Arc::new(login),
            password_reset: Arc::new(password_reset),
            proxy,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
