//! CORS layer configuration.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use tutorhub_core::config::CorsConfig;

/// Gateway headers browsers must be allowed to send.
const CONTEXT_HEADERS: [&str; 4] = ["content-type", "x-user-id", "x-user-role", "x-teacher-id"];

/// Builds a CORS tower layer from configuration.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    layer
        .allow_methods(methods)
        .allow_headers(CONTEXT_HEADERS.map(HeaderName::from_static))
        .max_age(std::time::Duration::from_secs(config.max_age_seconds))
}
