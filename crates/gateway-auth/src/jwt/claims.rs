//! JWT claims embedded in every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gateway_core::error::AppError;
use gateway_core::types::{Role, SessionRecord, Subject};

/// Claims payload of a session token.
///
/// Carries exactly what the session authenticator needs to rebuild a
/// [`SessionRecord`] without asking the identity backend again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject: the identity backend user id.
    pub sub: String,
    /// Email at issuance.
    pub email: String,
    /// First name at issuance.
    pub first_name: String,
    /// Role at issuance.
    pub role: Role,
    /// Mirrors `role == admin` for backends that still read the flag.
    #[serde(default)]
    pub is_admin: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Builds claims for `subject`, valid for `ttl_seconds` from `now`.
    pub fn for_subject(subject: &Subject, now: DateTime<Utc>, ttl_seconds: i64) -> Self {
        Self {
            sub: subject.id.clone(),
            email: subject.email.clone(),
            first_name: subject.first_name.clone(),
            role: subject.role,
            is_admin: subject.role == Role::Admin,
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_seconds,
        }
    }

    /// Maps the claims one-to-one into a session record.
    pub fn into_session(self) -> Result<SessionRecord, AppError> {
        let issued_at = DateTime::from_timestamp(self.iat, 0)
            .ok_or_else(|| AppError::unauthenticated("Token has an invalid issued-at claim"))?;

        Ok(SessionRecord {
            subject_id: self.sub,
            email: self.email,
            first_name: self.first_name,
            role: self.role,
            issued_at,
        })
    }
}
