//! Shared domain types.

pub mod role;
pub mod session;
pub mod subject;

pub use role::Role;
pub use session::SessionRecord;
pub use subject::Subject;
