//! Custom Axum extractors.

pub mod auth;
pub mod multipart;
pub mod path;
pub mod validated;

pub use auth::AuthSession;
pub use multipart::FormData;
pub use path::NumericId;
pub use validated::{ValidatedJson, ValidatedQuery};
