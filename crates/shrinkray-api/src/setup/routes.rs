//! Route configuration

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post, put},
    Router,
};
use shrinkray_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the gateway router: the two public routes plus a health check.
pub fn setup_routes(state: Arc<AppState>) -> Router {
    let body_limit = state.upload.validator.max_file_size();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/subscribe", post(handlers::subscribe::subscribe))
        .route(
            "/upload-image/{bucket}/{filename}",
            put(handlers::upload::upload_image),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
