//! Auth handlers: login, forgot-password, profile.

use axum::Json;
use axum::extract::State;

use gateway_auth::jwt::IssuedToken;
use gateway_auth::rbac::Operation;
use gateway_core::types::SessionRecord;

use crate::dto::request::{ForgotPasswordRequest, LoginRequest};
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::{AuthSession, ValidatedJson};
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    state.authorizer.authorize_operation(None, Operation::Login)?;
    let issued = state.login.login(&req.email, &req.password).await?;
    Ok(Json(issued))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .authorizer
        .authorize_operation(None, Operation::ForgotPassword)?;
    state.password_reset.request(&req.email).await?;
    Ok(Json(MessageResponse {
        message: "Password reset link sent".to_string(),
    }))
}

/// GET /profile
pub async fn profile(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<SessionRecord>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::Profile)?;
    Ok(Json(session))
}
