//! Login: credentials in, session token out.

use tracing::info;

use gateway_core::error::AppError;

use crate::credentials::CredentialAuthenticator;
use crate::jwt::{IssuedToken, TokenIssuer};

/// Orchestrates credential verification and token issuance.
#[derive(Debug, Clone)]
pub struct LoginService {
    credentials: CredentialAuthenticator,
    issuer: TokenIssuer,
}

impl LoginService {
    /// Creates a login service.
    pub fn new(credentials: CredentialAuthenticator, issuer: TokenIssuer) -> Self {
        Self {
            credentials,
            issuer,
        }
    }

    /// Verifies `email`/`password` and issues a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AppError> {
        let subject = self
            .credentials
            .authenticate(email, password)
            .await
            .ok_or_else(|| AppError::unauthenticated("Invalid credentials"))?;

        let issued = self.issuer.issue(&subject)?;
        info!(user_id = %subject.id, role = %subject.role, "User logged in");
        Ok(issued)
    }
}
