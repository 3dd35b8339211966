//! Access assignment and reporting handlers.

use axum::Json;
use axum::extract::{Path, State};
use bytes::Bytes;
use serde_json::Value;

use tutorhub_core::types::MaterialId;
use tutorhub_entity::visibility::AccessReport;

use super::parse_json;
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// GET /materials/{id}/students
pub async fn access_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AccessReport>, ApiError> {
    let id: MaterialId = parse_id(&id, "material")?;
    state.material_service.get_managed(&auth, id).await?;

    let report = state.listing_service.access_report(id).await?;
    Ok(Json(report))
}

/// PUT /materials/{id}/access
///
/// Body is the full desired set of student ids for this material.
pub async fn set_access(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: MaterialId = parse_id(&id, "material")?;
    let payload: Value = parse_json(&body)?;
    state.material_service.get_managed(&auth, id).await?;

    let change = state.access_engine.set_access_json(id, &payload).await?;
    Ok(Json(MessageResponse::new(change.summary())))
}
