//! Material CRUD: creation (with optional upload), lookup, rename, delete.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::traits::BlobStore;
use tutorhub_core::types::{MaterialId, TeacherId};
use tutorhub_database::store::{Directory, MaterialStore};
use tutorhub_entity::material::{Material, MaterialKind, NewMaterial, validate_name};
use tutorhub_storage::upload_key;

use crate::context::{RequestContext, UserRole};

/// A file received with a create request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-side file name.
    pub file_name: String,
    /// File contents.
    pub data: Bytes,
}

/// Request to create a material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMaterialRequest {
    /// Display name. Defaults to the uploaded file name.
    pub name: Option<String>,
    /// Folder or file. Defaults to file when an upload is attached.
    pub kind: Option<MaterialKind>,
    /// Parent folder.
    pub parent_id: Option<MaterialId>,
    /// Locator of a blob stored elsewhere (files only).
    pub storage_locator: Option<String>,
    /// Uploaded contents (files only).
    #[serde(skip)]
    pub upload: Option<UploadedFile>,
}

/// Manages material CRUD operations.
#[derive(Debug, Clone)]
pub struct MaterialService {
    /// Material store.
    materials: Arc<dyn MaterialStore>,
    /// Course directory, for teacher lookups.
    directory: Arc<dyn Directory>,
    /// Blob storage for uploads.
    blobs: Arc<dyn BlobStore>,
}

impl MaterialService {
    /// Creates a new material service.
    pub fn new(
        materials: Arc<dyn MaterialStore>,
        directory: Arc<dyn Directory>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            materials,
            directory,
            blobs,
        }
    }

    /// Gets a material by ID.
    pub async fn get(&self, material_id: MaterialId) -> AppResult<Material> {
        self.materials.get(material_id).await
    }

    /// Load a material the caller is allowed to manage.
    pub async fn get_managed(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
    ) -> AppResult<Material> {
        let material = self.materials.get(material_id).await?;
        if !ctx.manages(material.owner_teacher_id) {
            return Err(AppError::authorization(format!(
                "You do not manage material {material_id}"
            )));
        }
        Ok(material)
    }

    /// Creates a folder or file. Files come either as an upload, which is
    /// written to blob storage first, or as an existing locator.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateMaterialRequest,
    ) -> AppResult<Material> {
        let parent = match req.parent_id {
            Some(parent_id) => Some(self.get_managed(ctx, parent_id).await?),
            None => None,
        };
        let owner = self.resolve_owner(ctx, parent.as_ref()).await?;

        let kind = req.kind.unwrap_or(if req.upload.is_some() {
            MaterialKind::File
        } else {
            MaterialKind::Folder
        });
        let name = req
            .name
            .clone()
            .or_else(|| req.upload.as_ref().map(|u| u.file_name.clone()))
            .unwrap_or_default();
        validate_name(&name)?;

        let mut new = NewMaterial {
            name,
            kind,
            parent_id: req.parent_id,
            owner_teacher_id: owner,
            storage_locator: req.storage_locator.clone(),
        };

        let uploaded = match (kind, req.upload) {
            (MaterialKind::Folder, Some(_)) => {
                return Err(AppError::validation("A folder cannot carry an uploaded file"));
            }
            (MaterialKind::File, Some(_)) if new.storage_locator.is_some() => {
                return Err(AppError::validation(
                    "Provide either an uploaded file or a storage locator, not both",
                ));
            }
            (MaterialKind::File, Some(upload)) => {
                let key = upload_key(owner, &upload.file_name);
                let locator = self.blobs.put(&key, upload.data).await?;
                new.storage_locator = Some(locator.clone());
                Some(locator)
            }
            _ => None,
        };

        let material = match self.materials.create(&new).await {
            Ok(material) => material,
            Err(e) => {
                if let Some(locator) = uploaded {
                    self.discard_blob(&locator).await;
                }
                return Err(e);
            }
        };

        info!(
            material_id = %material.id,
            kind = %material.kind,
            parent_id = ?material.parent_id,
            teacher_id = %owner,
            "Material created"
        );
        Ok(material)
    }

    /// Renames a material.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        name: &str,
    ) -> AppResult<Material> {
        validate_name(name)?;
        self.get_managed(ctx, material_id).await?;
        let material = self.materials.rename(material_id, name).await?;
        info!(material_id = %material_id, name = %material.name, "Material renamed");
        Ok(material)
    }

    /// Deletes a material with its subtree. Blobs of removed files are
    /// deleted best effort. Returns the removed materials.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
    ) -> AppResult<Vec<Material>> {
        self.get_managed(ctx, material_id).await?;
        let removed = self.materials.delete_subtree(material_id).await?;

        for locator in removed.iter().filter_map(|m| m.storage_locator.as_deref()) {
            self.discard_blob(locator).await;
        }

        info!(material_id = %material_id, removed = removed.len(), "Material deleted");
        Ok(removed)
    }

    async fn resolve_owner(
        &self,
        ctx: &RequestContext,
        parent: Option<&Material>,
    ) -> AppResult<TeacherId> {
        // A parent has already passed the manage check; its owner wins.
        let owner = match (parent, ctx.role, ctx.teacher_id) {
            (Some(parent), _, _) => parent.owner_teacher_id,
            (None, UserRole::Teacher | UserRole::Admin, Some(teacher_id)) => teacher_id,
            _ => {
                return Err(AppError::authorization(
                    "Only teachers can create root materials",
                ));
            }
        };

        if !self.directory.teacher_exists(owner).await? {
            return Err(AppError::not_found(format!("Teacher {owner} not found")));
        }
        Ok(owner)
    }

    async fn discard_blob(&self, locator: &str) {
        if let Err(e) = self.blobs.delete(locator).await {
            warn!(locator, error = %e, "Failed to delete material blob");
        }
    }
}
