//! Collaborator traits implemented outside the core.

pub mod notifier;

pub use notifier::{Notifier, ResetNotice};
