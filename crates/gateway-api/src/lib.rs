//! # gateway-api
//!
//! HTTP surface of the supermarket gateway built on Axum.
//!
//! Every protected handler follows the same chain: the `AuthSession`
//! extractor authenticates the bearer token, the handler asks the role
//! authorizer about its operation, then calls the owning backend through
//! the service proxy and returns the payload unchanged.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
