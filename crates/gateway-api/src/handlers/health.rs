//! Health and backend liveness handlers.

use axum::Json;
use axum::extract::State;

use gateway_auth::rbac::Operation;
use gateway_rpc::{PingReport, ServiceTag};

use crate::dto::response::HealthResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// GET /user/ping
pub async fn ping_identity(State(state): State<AppState>) -> Result<Json<PingReport>, ApiError> {
    ping(&state, ServiceTag::Identity, Operation::PingIdentity).await
}

/// GET /product/ping
pub async fn ping_catalog(State(state): State<AppState>) -> Result<Json<PingReport>, ApiError> {
    ping(&state, ServiceTag::Catalog, Operation::PingCatalog).await
}

/// GET /order/ping
pub async fn ping_ordering(State(state): State<AppState>) -> Result<Json<PingReport>, ApiError> {
    ping(&state, ServiceTag::Ordering, Operation::PingOrdering).await
}

async fn ping(
    state: &AppState,
    service: ServiceTag,
    operation: Operation,
) -> Result<Json<PingReport>, ApiError> {
    state.authorizer.authorize_operation(None, operation)?;
    Ok(Json(state.proxy.ping(service).await?))
}
