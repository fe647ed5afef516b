//! Order handlers, served by the ordering backend.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use gateway_auth::rbac::Operation;
use gateway_core::types::SessionRecord;
use gateway_rpc::command::ordering;

use crate::dto::request::{CreateOrderRequest, UpdateOrderStatusRequest};
use crate::error::ApiError;
use crate::extractors::{AuthSession, NumericId, ValidatedJson};
use crate::state::AppState;

/// POST /order
pub async fn create_order(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::CreateOrder)?;
    let reply = state
        .proxy
        .call(
            &ordering::CREATE_ORDER,
            json!({ "customer_id": req.customer_id }),
        )
        .await?;
    Ok(Json(reply))
}

/// PATCH /order/{id}
pub async fn update_order_status(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
    ValidatedJson(req): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::UpdateOrderStatus)?;
    let reply = state
        .proxy
        .call(
            &ordering::UPDATE_ORDER_STATUS,
            json!({ "id": id, "status": req.status }),
        )
        .await?;
    Ok(Json(reply))
}

/// GET /order/{id}
pub async fn find_order_by_id(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::FindOrderById)?;
    let reply = state
        .proxy
        .call(&ordering::FIND_ORDER_BY_ID, json!({ "id": id }))
        .await?;
    Ok(Json(reply))
}

/// GET /order
pub async fn find_orders(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::FindOrders)?;
    let reply = state
        .proxy
        .call(&ordering::FIND_ORDERS_BY_FIELDS, orders_filter(&session))
        .await?;
    Ok(Json(reply))
}

/// Admins see every order; everyone else only their own.
fn orders_filter(session: &SessionRecord) -> Value {
    if session.is_admin() {
        json!({})
    } else {
        json!({ "user_id": session.subject_id })
    }
}
