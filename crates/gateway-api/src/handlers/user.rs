//! User handlers, served by the identity backend.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use gateway_auth::rbac::Operation;
use gateway_core::error::AppError;
use gateway_rpc::command::identity;

use crate::dto::request::{
    AddressRequest, CreateUserRequest, UpdatePasswordRequest, UpdateProfileRequest,
};
use crate::error::ApiError;
use crate::extractors::{AuthSession, NumericId, ValidatedJson};
use crate::state::AppState;

/// POST /user
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(None, Operation::CreateUser)?;
    let reply = state
        .proxy
        .call(&identity::CREATE_USER, serde_json::to_value(req).map_err(AppError::from)?)
        .await?;
    Ok(Json(reply))
}

/// GET /user/{id}
pub async fn show_user(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::ShowUser)?;
    let reply = state
        .proxy
        .call(&identity::SHOW_USER, json!({ "id": id }))
        .await?;
    Ok(Json(reply))
}

/// PATCH /user/profile/{id}
pub async fn update_profile(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::UpdateUserProfile)?;
    let payload = merge(json!({ "id": id }), serde_json::to_value(req).map_err(AppError::from)?);
    let reply = state.proxy.call(&identity::UPDATE_PROFILE, payload).await?;
    Ok(Json(reply))
}

/// PUT /user/address/{id}
pub async fn update_address(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
    ValidatedJson(req): ValidatedJson<AddressRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::UpdateUserAddress)?;
    let payload = merge(json!({ "id": id }), serde_json::to_value(req).map_err(AppError::from)?);
    let reply = state.proxy.call(&identity::UPDATE_ADDRESS, payload).await?;
    Ok(Json(reply))
}

/// PATCH /user/password
///
/// Always targets the caller's own account.
pub async fn update_password(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::UpdateUserPassword)?;
    let reply = state
        .proxy
        .call(
            &identity::UPDATE_PASSWORD,
            json!({ "id": session.subject_id, "password": req.password }),
        )
        .await?;
    Ok(Json(reply))
}

/// DELETE /user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::DeleteUser)?;
    let reply = state
        .proxy
        .call(&identity::DELETE_USER, json!({ "id": id }))
        .await?;
    Ok(Json(reply))
}

/// Shallow-merges the fields of `extra` into `base`; `base` wins on conflicts.
pub(crate) fn merge(base: Value, extra: Value) -> Value {
    match (base, extra) {
        (Value::Object(mut base), Value::Object(extra)) => {
            for (key, value) in extra {
                base.entry(key).or_insert(value);
            }
            Value::Object(base)
        }
        (base, _) => base,
    }
}
