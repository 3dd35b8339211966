//! Route definitions for the TutorHub HTTP API.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(material_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}

/// Material endpoints: tree CRUD, listings, access
fn material_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/materials",
            get(handlers::material::list_materials).post(handlers::material::create_material),
        )
        .route(
            "/materials/user/{user_id}",
            get(handlers::material::list_user_materials),
        )
        .route(
            "/materials/{id}",
            get(handlers::material::get_material)
                .put(handlers::material::rename_material)
                .delete(handlers::material::delete_material),
        )
        .route("/materials/{id}/tree", get(handlers::material::get_tree))
        .route(
            "/materials/{id}/students",
            get(handlers::access::access_report),
        )
        .route("/materials/{id}/access", put(handlers::access::set_access))
}

/// Health endpoints
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}
