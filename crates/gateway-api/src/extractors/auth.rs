//! `AuthSession` extractor: verifies the bearer token and yields the session.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use gateway_core::error::AppError;
use gateway_core::types::SessionRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated session of the current request.
///
/// Handlers receive it as an argument and pass it on explicitly to the
/// authorizer and to whatever needs the caller's identity.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionRecord);

impl std::ops::Deref for AuthSession {
    type Target = SessionRecord;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer =
            match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
                Ok(TypedHeader(Authorization(bearer))) => Some(bearer),
                Err(rejection) if rejection.is_missing() => None,
                Err(_) => {
                    return Err(AppError::unauthenticated("Invalid Authorization header").into());
                }
            };

        let session = state
            .session_authenticator
            .authenticate(bearer.as_ref().map(Bearer::token))?;
        Ok(AuthSession(session))
    }
}
