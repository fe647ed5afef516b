//! Role authorization.

use std::collections::HashSet;

use tracing::debug;

use gateway_core::error::AppError;
use gateway_core::types::{Role, SessionRecord};

use super::policies::{Operation, RolePolicy};

/// Checks a session's role against the policy table.
///
/// Membership is flat: a role satisfies a rule only if it is listed.
#[derive(Debug, Clone)]
pub struct RoleAuthorizer {
    /// The policy table.
    policy: RolePolicy,
}

impl RoleAuthorizer {
    /// Creates an authorizer with the gateway's policy table.
    pub fn new() -> Self {
        Self {
            policy: RolePolicy::new(),
        }
    }

    /// Allows iff the session's role is in `required`.
    ///
    /// An absent session is anonymous and matches no role. An empty
    /// `required` set denies everyone.
    pub fn authorize(
        &self,
        session: Option<&SessionRecord>,
        required: &HashSet<Role>,
    ) -> Result<(), AppError> {
        match session {
            Some(s) if required.contains(&s.role) => Ok(()),
            Some(s) => Err(AppError::forbidden(format!(
                "Role '{}' is not allowed to perform this operation",
                s.role
            ))),
            None => Err(AppError::forbidden(
                "Anonymous requests are not allowed to perform this operation",
            )),
        }
    }

    /// Authorizes `operation` against the policy table.
    pub fn authorize_operation(
        &self,
        session: Option<&SessionRecord>,
        operation: Operation,
    ) -> Result<(), AppError> {
        let Some(required) = self.policy.required_roles(operation) else {
            return Ok(());
        };
        self.authorize(session, required).inspect_err(|_| {
            debug!(
                operation = %operation,
                user_id = session.map(|s| s.subject_id.as_str()).unwrap_or("anonymous"),
                "Authorization denied"
            );
        })
    }

    /// Returns a reference to the policy table.
    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }
}

impl Default for RoleAuthorizer {
    fn default() -> Self {
        Self::new()
    }
}
