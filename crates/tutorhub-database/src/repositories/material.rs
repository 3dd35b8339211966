//! Material repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use tutorhub_core::error::{AppError, ErrorKind};
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, TeacherId};
use tutorhub_entity::material::{Material, NewMaterial, TreeLink};

use super::{db_error, tree};
use crate::store::MaterialStore;

/// Repository for material CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    /// Create a new material repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }
}

#[async_trait]
impl MaterialStore for MaterialRepository {
    async fn create(&self, new: &NewMaterial) -> AppResult<Material> {
        new.validate()?;
        let mut tx = self.begin().await?;

        if let Some(parent_id) = new.parent_id {
            let parent = sqlx::query_as::<_, Material>("SELECT * FROM materials WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to find parent material"))?
                .ok_or_else(|| {
                    AppError::not_found(format!("Parent material {parent_id} not found"))
                })?;
            if !parent.is_folder() {
                return Err(AppError::validation(format!(
                    "Parent material {parent_id} is not a folder"
                )));
            }
            let root = tree::tree_root(&mut tx, parent_id)
                .await?
                .unwrap_or(parent_id);
            tree::lock_tree(&mut tx, root).await?;
        }

        let material = sqlx::query_as::<_, Material>(
            "INSERT INTO materials (name, kind, parent_id, owner_teacher_id, storage_locator) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(new.name.trim())
        .bind(new.kind)
        .bind(new.parent_id)
        .bind(new.owner_teacher_id)
        .bind(&new.storage_locator)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create material"))?;

        if let Some(parent_id) = new.parent_id {
            let inherited = sqlx::query(
                "INSERT INTO material_visibility (material_id, student_id) \
                 SELECT $1, student_id FROM material_visibility WHERE material_id = $2 \
                 ON CONFLICT (material_id, student_id) DO NOTHING",
            )
            .bind(material.id)
            .bind(parent_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to inherit parent visibility"))?
            .rows_affected();
            debug!(material_id = %material.id, inherited, "Inherited parent visibility");
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit material creation"))?;
        Ok(material)
    }

    async fn find_by_id(&self, id: MaterialId) -> AppResult<Option<Material>> {
        sqlx::query_as::<_, Material>("SELECT * FROM materials WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find material"))
    }

    async fn list_children(
        &self,
        parent_id: Option<MaterialId>,
        owner: Option<TeacherId>,
    ) -> AppResult<Vec<Material>> {
        sqlx::query_as::<_, Material>(
            "SELECT * FROM materials \
             WHERE parent_id IS NOT DISTINCT FROM $1 \
               AND ($2::BIGINT IS NULL OR owner_teacher_id = $2) \
             ORDER BY id ASC",
        )
        .bind(parent_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list materials"))
    }

    async fn rename(&self, id: MaterialId, name: &str) -> AppResult<Material> {
        sqlx::query_as::<_, Material>(
            "UPDATE materials SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to rename material"))?
        .ok_or_else(|| AppError::not_found(format!("Material {id} not found")))
    }

    async fn delete_subtree(&self, id: MaterialId) -> AppResult<Vec<Material>> {
        let mut tx = self.begin().await?;

        let root = tree::tree_root(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Material {id} not found")))?;
        tree::lock_tree(&mut tx, root).await?;

        let removed = tree::subtree_rows(&mut tx, id).await?;

        // Child rows and their grants go with the FK cascades.
        sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete material"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit material deletion"))?;
        Ok(removed)
    }

    async fn subtree_links(&self, root: MaterialId) -> AppResult<Vec<TreeLink>> {
        let mut conn = self.pool.acquire().await.map_err(db_error("Failed to acquire connection"))?;
        tree::subtree_links(&mut conn, root).await
    }

    async fn subtree(&self, root: MaterialId) -> AppResult<Vec<Material>> {
        let mut conn = self.pool.acquire().await.map_err(db_error("Failed to acquire connection"))?;
        tree::subtree_rows(&mut conn, root).await
    }

    async fn ancestry_links(&self, id: MaterialId) -> AppResult<Vec<TreeLink>> {
        let mut conn = self.pool.acquire().await.map_err(db_error("Failed to acquire connection"))?;
        tree::ancestry_links(&mut conn, id).await
    }
}
