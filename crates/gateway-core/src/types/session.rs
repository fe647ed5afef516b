//! Per-request session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::role::Role;

/// Who is acting on the current request.
///
/// Reconstructed from bearer token claims on every authenticated request
/// and threaded explicitly from the authenticator into the authorizer and
/// the handler. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Identity backend subject id.
    #[serde(rename = "userId")]
    pub subject_id: String,
    /// Email at the time the token was issued.
    pub email: String,
    /// First name at the time the token was issued.
    pub first_name: String,
    /// Role at the time the token was issued.
    pub role: Role,
    /// When the backing token was issued.
    pub issued_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Returns whether the session holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
