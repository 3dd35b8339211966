//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health/detailed
pub async fn detailed_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let storage = match state.blobs.health_check().await {
        Ok(true) => "available",
        Ok(false) => "unavailable",
        Err(e) => {
            tracing::warn!(error = %e, "Blob storage health check failed");
            "error"
        }
    };

    Json(DetailedHealthResponse {
        status: if storage == "available" { "ok" } else { "degraded" }.to_string(),
        storage_provider: state.blobs.provider_type().to_string(),
        storage: storage.to_string(),
    })
}
