//! # gateway-core
//!
//! Core crate for the supermarket edge gateway. Contains the unified error
//! taxonomy, configuration schemas, the session/subject types shared by the
//! authenticators and the HTTP layer, and the collaborator traits the core
//! calls out to.
//!
//! This crate has **no** internal dependencies on other gateway crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
