//! Material tree handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use bytes::Bytes;
use validator::Validate;

use tutorhub_core::error::AppError;
use tutorhub_core::types::{MaterialId, UserId};
use tutorhub_entity::material::Material;
use tutorhub_service::context::UserRole;
use tutorhub_service::material::MaterialNode;

use super::parse_json;
use crate::dto::request::RenameMaterialRequest;
use crate::dto::response::DeleteMaterialResponse;
use crate::error::ApiError;
use crate::extractors::path::parse_id;
use crate::extractors::{AuthUser, CreateMaterialForm, ListingParams};
use crate::state::AppState;

/// GET /materials
///
/// Without `ParentId` a teacher sees only their own root materials.
pub async fn list_materials(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<Material>>, ApiError> {
    let mut query = params.into_query()?;
    if let Some(auth) = &auth {
        if auth.role == UserRole::Teacher {
            query.owner = auth.teacher_id;
        }
    }

    let materials = state.listing_service.list_children(&query).await?;
    Ok(Json(materials))
}

/// GET /materials/user/{user_id}
pub async fn list_user_materials(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(user_id): Path<String>,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<Material>>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    if let Some(auth) = &auth {
        if auth.role == UserRole::Student && auth.user_id != user_id {
            return Err(AppError::authorization("Students can only list their own materials").into());
        }
    }

    let query = params.into_query()?;
    let materials = state
        .listing_service
        .list_visible_to_user(user_id, &query)
        .await?;
    Ok(Json(materials))
}

/// GET /materials/{id}
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Material>, ApiError> {
    let id: MaterialId = parse_id(&id, "material")?;
    let material = state.material_service.get(id).await?;
    Ok(Json(material))
}

/// GET /materials/{id}/tree
pub async fn get_tree(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MaterialNode>, ApiError> {
    let id: MaterialId = parse_id(&id, "material")?;
    let tree = state.tree_navigator.load_tree(id).await?;
    Ok(Json(tree))
}

/// POST /materials
pub async fn create_material(
    State(state): State<AppState>,
    auth: AuthUser,
    CreateMaterialForm(req): CreateMaterialForm,
) -> Result<(StatusCode, Json<Material>), ApiError> {
    let material = state.material_service.create(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// PUT /materials/{id}
pub async fn rename_material(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Material>, ApiError> {
    let id: MaterialId = parse_id(&id, "material")?;
    let req: RenameMaterialRequest = parse_json(&body)?;
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let material = state.material_service.rename(&auth, id, &req.name).await?;
    Ok(Json(material))
}

/// DELETE /materials/{id}
pub async fn delete_material(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteMaterialResponse>, ApiError> {
    let id: MaterialId = parse_id(&id, "material")?;
    let removed = state.material_service.delete(&auth, id).await?;

    Ok(Json(DeleteMaterialResponse {
        message: format!("Material {id} deleted with {} item(s)", removed.len()),
        removed: removed.into_iter().map(|m| m.id).collect(),
    }))
}
