//! Ordered, filtered views of a folder's contents.

use std::sync::Arc;

use tracing::debug;

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{
    ExtensionFilter, MaterialId, MaterialOrder, StudentId, TeacherId, UserId,
};
use tutorhub_database::store::{Directory, MaterialStore, VisibilityStore};
use tutorhub_entity::material::Material;
use tutorhub_entity::visibility::AccessReport;

/// Parameters shared by every listing.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Folder to list (None for roots).
    pub parent_id: Option<MaterialId>,
    /// Sort order applied before the folder-first partition.
    pub order: MaterialOrder,
    /// Allowed file extensions; folders always pass.
    pub extensions: ExtensionFilter,
    /// Narrow root listings to one teacher's trees.
    pub owner: Option<TeacherId>,
}

impl ListingQuery {
    /// Listing of one folder with default order and no filter.
    pub fn children_of(parent_id: Option<MaterialId>) -> Self {
        Self {
            parent_id,
            ..Self::default()
        }
    }
}

/// Filter by extension, sort, then move folders ahead of files.
///
/// `materials` must be in insertion order. Every step is stable, so ties
/// keep insertion order.
pub fn arrange(
    materials: Vec<Material>,
    order: MaterialOrder,
    extensions: &ExtensionFilter,
) -> Vec<Material> {
    let mut materials: Vec<Material> = materials
        .into_iter()
        .filter(|m| m.is_folder() || extensions.allows(&m.name))
        .collect();

    match order {
        MaterialOrder::NewestFirst => materials.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        MaterialOrder::OldestFirst => materials.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        MaterialOrder::Alphabetical => materials.sort_by_cached_key(|m| m.name.to_lowercase()),
        MaterialOrder::Unordered => {}
    }

    let (mut folders, files): (Vec<Material>, Vec<Material>) =
        materials.into_iter().partition(Material::is_folder);
    folders.extend(files);
    folders
}

/// Read-only listings and the access report.
#[derive(Debug, Clone)]
pub struct MaterialListingService {
    /// Material store.
    materials: Arc<dyn MaterialStore>,
    /// Visibility store.
    visibility: Arc<dyn VisibilityStore>,
    /// Course directory.
    directory: Arc<dyn Directory>,
}

impl MaterialListingService {
    /// Creates a new listing service.
    pub fn new(
        materials: Arc<dyn MaterialStore>,
        visibility: Arc<dyn VisibilityStore>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            materials,
            visibility,
            directory,
        }
    }

    /// Immediate children of a folder (or roots), filtered and ordered.
    pub async fn list_children(&self, query: &ListingQuery) -> AppResult<Vec<Material>> {
        let children = self
            .materials
            .list_children(query.parent_id, query.owner)
            .await?;
        Ok(arrange(children, query.order, &query.extensions))
    }

    /// Like [`Self::list_children`], restricted to what a student may see.
    pub async fn list_visible_to_student(
        &self,
        student_id: StudentId,
        query: &ListingQuery,
    ) -> AppResult<Vec<Material>> {
        let children = self
            .materials
            .list_children(query.parent_id, query.owner)
            .await?;
        let ids: Vec<MaterialId> = children.iter().map(|m| m.id).collect();
        let visible = self.visibility.visible_among(student_id, &ids).await?;

        let children: Vec<Material> = children
            .into_iter()
            .filter(|m| visible.contains(&m.id))
            .collect();
        debug!(
            student_id = %student_id,
            parent_id = ?query.parent_id,
            visible = children.len(),
            "Listed student-visible materials"
        );
        Ok(arrange(children, query.order, &query.extensions))
    }

    /// Student-visible listing for the student profile of a user account.
    pub async fn list_visible_to_user(
        &self,
        user_id: UserId,
        query: &ListingQuery,
    ) -> AppResult<Vec<Material>> {
        let student_id = self
            .directory
            .student_for_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No student found for user {user_id}")))?;
        self.list_visible_to_student(student_id, query).await
    }

    /// The owning teacher's roster, each student flagged with whether they
    /// hold an explicit grant on this exact material.
    pub async fn access_report(&self, material_id: MaterialId) -> AppResult<AccessReport> {
        let material = self.materials.get(material_id).await?;
        let granted = self.visibility.student_ids(material_id).await?;
        let roster = self
            .directory
            .roster_for_teacher(material.owner_teacher_id)
            .await?;
        let report = AccessReport::build(material_id, material.owner_teacher_id, &roster, &granted);
        debug!(
            material_id = %material_id,
            students = report.student_count(),
            granted = granted.len(),
            "Built access report"
        );
        Ok(report)
    }
}
