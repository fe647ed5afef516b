//! Typed path parameter helpers.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use gateway_core::error::AppError;

use crate::error::ApiError;

/// A single `{id}` path segment that must be a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericId(pub u64);

/// Parses a numeric id from a path segment.
pub fn parse_id(s: &str) -> Result<u64, AppError> {
    s.parse::<u64>()
        .map_err(|_| AppError::validation(format!("id must be a number string, got '{s}'")))
}

impl<S: Send + Sync> FromRequestParts<S> for NumericId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        Ok(Self(parse_id(&raw)?))
    }
}
