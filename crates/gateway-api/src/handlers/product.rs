//! Product handlers, served by the catalog backend.

use axum::Json;
use axum::extract::State;
use serde_json::{Map, Value, json};

use gateway_auth::rbac::Operation;
use gateway_core::error::AppError;
use gateway_rpc::command::catalog;

use crate::dto::request::{FindProductsQuery, ProductForm};
use crate::error::ApiError;
use crate::extractors::{AuthSession, FormData, NumericId, ValidatedQuery};
use crate::state::AppState;

/// POST /product
pub async fn create_product(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    form: FormData,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::CreateProduct)?;
    let payload = product_payload(&form, None)?;
    let reply = state.proxy.call(&catalog::CREATE_PRODUCT, payload).await?;
    Ok(Json(reply))
}

/// GET /product
pub async fn find_products(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ValidatedQuery(query): ValidatedQuery<FindProductsQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::FindProducts)?;
    let reply = state
        .proxy
        .call(
            &catalog::FIND_PRODUCTS_BY_FIELDS,
            serde_json::to_value(query).map_err(AppError::from)?,
        )
        .await?;
    Ok(Json(reply))
}

/// GET /product/{id}
pub async fn find_product_by_id(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::FindProductById)?;
    let reply = state
        .proxy
        .call(&catalog::FIND_PRODUCT_BY_ID, json!({ "id": id }))
        .await?;
    Ok(Json(reply))
}

/// PUT /product/{id}
pub async fn update_product(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
    form: FormData,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::UpdateProduct)?;
    let payload = product_payload(&form, Some(id))?;
    let reply = state.proxy.call(&catalog::UPDATE_PRODUCT, payload).await?;
    Ok(Json(reply))
}

/// DELETE /product/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    NumericId(id): NumericId,
) -> Result<Json<Value>, ApiError> {
    state
        .authorizer
        .authorize_operation(Some(&session), Operation::DeleteProduct)?;
    let reply = state
        .proxy
        .call(&catalog::DELETE_PRODUCT, json!({ "id": id }))
        .await?;
    Ok(Json(reply))
}

/// Builds the backend payload: numeric price and category id, plus the file.
fn product_payload(form: &FormData, id: Option<u64>) -> Result<Value, AppError> {
    let product: ProductForm = form.parse()?;

    let mut payload = Map::new();
    if let Some(id) = id {
        payload.insert("id".into(), json!(id));
    }
    payload.insert("name".into(), json!(product.name));
    payload.insert("sku".into(), json!(product.sku));
    payload.insert("description".into(), json!(product.description));
    payload.insert("price".into(), json!(parse_number(&product.price)?));
    if let Some(category_id) = &product.category_id {
        payload.insert("category_id".into(), json!(parse_integer(category_id)?));
    }
    if let Some(image) = &form.image {
        payload.insert("file".into(), image.clone());
    }
    Ok(Value::Object(payload))
}

fn parse_number(raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::validation(format!("price must be a number string, got '{raw}'")))
}

fn parse_integer(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse::<i64>().map_err(|_| {
        AppError::validation(format!("category_id must be a number string, got '{raw}'"))
    })
}
