//! Route definitions for the gateway HTTP API.
//!
//! Routes are grouped by owning backend. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors_origins);

    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(product_routes())
        .merge(category_routes())
        .merge(order_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, password reset, and the caller's own session
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/profile", get(handlers::auth::profile))
}

/// Identity backend
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(handlers::user::create_user))
        .route("/user/ping", get(handlers::health::ping_identity))
        .route("/user/password", patch(handlers::user::update_password))
        .route("/user/profile/{id}", patch(handlers::user::update_profile))
        .route("/user/address/{id}", put(handlers::user::update_address))
        .route(
            "/user/{id}",
            get(handlers::user::show_user).delete(handlers::user::delete_user),
        )
}

/// Catalog backend: products
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/product/ping", get(handlers::health::ping_catalog))
        .route(
            "/product",
            get(handlers::product::find_products).post(handlers::product::create_product),
        )
        .route(
            "/product/{id}",
            get(handlers::product::find_product_by_id)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        )
}

/// Catalog backend: categories
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/category", post(handlers::category::create_category))
        .route(
            "/category/{id}",
            put(handlers::category::update_category).delete(handlers::category::delete_category),
        )
}

/// Ordering backend
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/order/ping", get(handlers::health::ping_ordering))
        .route(
            "/order",
            get(handlers::order::find_orders).post(handlers::order::create_order),
        )
        .route(
            "/order/{id}",
            get(handlers::order::find_order_by_id).patch(handlers::order::update_order_status),
        )
}

/// Process health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
