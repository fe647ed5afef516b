//! Token issuing.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gateway_core::config::AuthConfig;
use gateway_core::error::AppError;
use gateway_core::types::Subject;

use super::claims::Claims;

/// Result of a successful issue, in the shape login clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Subject the token was issued for.
    #[serde(rename = "user_id")]
    pub subject_id: String,
    /// Signed bearer token.
    #[serde(rename = "access_token")]
    pub token: String,
}

/// Mints signed session tokens from authenticated subjects.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token lifetime in seconds.
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_seconds: i64::try_from(config.token_ttl_seconds).unwrap_or(i64::MAX / 2),
        }
    }

    /// Signs a token embedding the subject's id, email, first name, and role.
    pub fn issue(&self, subject: &Subject) -> Result<IssuedToken, AppError> {
        let claims = Claims::for_subject(subject, Utc::now(), self.ttl_seconds);
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        debug!(user_id = %subject.id, role = %subject.role, exp = claims.exp, "Issued session token");

        Ok(IssuedToken {
            subject_id: subject.id.clone(),
            token,
        })
    }
}
