//! Category handlers, served by the catalog backend.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use gateway_auth::rbac::Operation;
use gateway_core::error::AppError;
use gateway_rpc::command::catalog;

use crate::dto::request::CategoryForm;
use crate::error::ApiError;
use crate::extractors::{AuthSession, FormData, NumericId};
use crate::state::AppState;

/// POST /category
pub async fn create_category(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    form: FormData,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::CreateCategory)?;
    let payload = category_payload(&form, None)?;
    let reply = state.proxy.call(&catalog::CREATE_CATEGORY, payload).await?;
    Ok(Json(reply))
}

/// PUT /category/{id}
pub async fn update_category(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
    form: FormData,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::UpdateCategory)?;
    let payload = category_payload(&form, Some(id))?;
    let reply = state.proxy.call(&catalog::UPDATE_CATEGORY, payload).await?;
    Ok(Json(reply))
}

/// DELETE /category/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::DeleteCategory)?;
    let reply = state
        .proxy
        .call(&catalog::DELETE_CATEGORY, json!({ "id": id }))
        .await?;
    Ok(Json(reply))
}

fn category_payload(form: &FormData, id: Option<u64>) -> Result<Value, AppError> {
    let category: CategoryForm = form.parse()?;
    let mut payload = json!({
        "name": category.name,
        "description": category.description,
        "image": form.image.clone(),
    });
    if let Some(id) = id {
        payload["id"] = json!(id);
    }
    Ok(payload)
}
