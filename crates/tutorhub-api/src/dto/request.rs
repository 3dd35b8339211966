//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use tutorhub_core::types::MaterialId;
use tutorhub_entity::material::MaterialKind;
use tutorhub_service::material::CreateMaterialRequest;

/// JSON body of `POST /materials` when no file is uploaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateMaterialBody {
    /// Display name.
    pub name: Option<String>,
    /// `folder` or `file`.
    pub kind: Option<MaterialKind>,
    /// Parent folder; absent or null for a root.
    pub parent_id: Option<MaterialId>,
    /// Locator of an already stored blob.
    pub storage_locator: Option<String>,
}

impl From<CreateMaterialBody> for CreateMaterialRequest {
    fn from(body: CreateMaterialBody) -> Self {
        Self {
            name: body.name,
            kind: body.kind,
            parent_id: body.parent_id,
            storage_locator: body.storage_locator,
            upload: None,
        }
    }
}

/// Body of `PUT /materials/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameMaterialRequest {
    /// New display name.
    #[serde(rename = "Name")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
}
