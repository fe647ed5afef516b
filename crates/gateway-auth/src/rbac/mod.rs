//! Role-based access control.

pub mod enforcer;
pub mod policies;

pub use enforcer::RoleAuthorizer;
pub use policies::{Operation, RolePolicy};
