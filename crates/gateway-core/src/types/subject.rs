//! The identity backend's view of a user, sanitized for use inside the gateway.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::types::role::Role;

/// Field names that must never leave the credential boundary.
pub const SECRET_FIELDS: [&str; 3] = ["password", "passwordHash", "password_hash"];

/// A user record as returned by the identity backend, minus secrets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Backend identifier, normalized to a string.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Given name shown in greetings and reset notices.
    pub first_name: String,
    /// Effective role.
    pub role: Role,
    /// Every other field the backend returned, passed through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Subject {
    /// Builds a subject from an identity backend reply.
    ///
    /// Secret fields are removed first. `role` wins when present; otherwise
    /// the legacy `isAdmin` flag selects between admin and customer. An
    /// unrecognized role string is a backend fault.
    pub fn from_identity_reply(reply: Value) -> Result<Self, AppError> {
        let Value::Object(mut fields) = reply else {
            return Err(AppError::backend_error(
                "Identity service returned a non-object subject",
            ));
        };

        for secret in SECRET_FIELDS {
            fields.remove(secret);
        }

        let id = match fields.remove("id") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(AppError::backend_error(
                    "Identity service returned a subject without an id",
                ));
            }
        };

        let email = take_string(&mut fields, "email").unwrap_or_default();
        let first_name = take_string(&mut fields, "firstName").unwrap_or_default();

        let is_admin = fields
            .get("isAdmin")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let role = match take_string(&mut fields, "role") {
            Some(role) => role.parse::<Role>().map_err(|_| {
                AppError::backend_error(format!(
                    "Identity service returned an unknown role '{role}'"
                ))
            })?,
            None if is_admin => Role::Admin,
            None => Role::Customer,
        };

        Ok(Self {
            id,
            email,
            first_name,
            role,
            attributes: fields,
        })
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) if !other.is_null() => {
            // Keep unexpected shapes visible to downstream consumers.
            fields.insert(key.to_string(), other);
            None
        }
        _ => None,
    }
}
