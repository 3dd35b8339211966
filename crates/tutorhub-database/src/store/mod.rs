//! Store traits the service layer is written against.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-memory one in `crate::memory`.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Debug;

use async_trait::async_trait;

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, StudentId, TeacherId, UserId};
use tutorhub_entity::directory::RosterEntry;
use tutorhub_entity::material::{Material, NewMaterial, TreeLink};

/// Persistent storage of the materials forest.
#[async_trait]
pub trait MaterialStore: Send + Sync + Debug + 'static {
    /// Insert a material. When it has a parent, the parent's visibility
    /// grants are copied to the new node in the same transaction.
    async fn create(&self, new: &NewMaterial) -> AppResult<Material>;

    /// Find a material by ID.
    async fn find_by_id(&self, id: MaterialId) -> AppResult<Option<Material>>;

    /// Fetch a material by ID, failing with `NotFound` when absent.
    async fn get(&self, id: MaterialId) -> AppResult<Material> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Material {id} not found")))
    }

    /// Children of `parent_id` (roots when `None`) in insertion order.
    /// Roots may be narrowed to a single owning teacher.
    async fn list_children(
        &self,
        parent_id: Option<MaterialId>,
        owner: Option<TeacherId>,
    ) -> AppResult<Vec<Material>>;

    /// Rename a material.
    async fn rename(&self, id: MaterialId, name: &str) -> AppResult<Material>;

    /// Delete a material and its whole subtree. Returns the removed rows.
    async fn delete_subtree(&self, id: MaterialId) -> AppResult<Vec<Material>>;

    /// Edges of the subtree rooted at `root`, the root included.
    async fn subtree_links(&self, root: MaterialId) -> AppResult<Vec<TreeLink>>;

    /// Every material of the subtree rooted at `root`, the root included,
    /// in insertion order. Empty when `root` does not exist.
    async fn subtree(&self, root: MaterialId) -> AppResult<Vec<Material>>;

    /// Edges from `id` up to its tree root, `id` included.
    async fn ancestry_links(&self, id: MaterialId) -> AppResult<Vec<TreeLink>>;
}

/// Persistent storage of (material, student) visibility grants.
#[async_trait]
pub trait VisibilityStore: Send + Sync + Debug + 'static {
    /// Open a unit of work for an access change. Reads issued before
    /// [`VisibilityTx::lock_tree`] see the latest committed state; from the
    /// lock on, every read sees one repeatable-read snapshot taken after
    /// the lock was granted.
    async fn begin(&self) -> AppResult<Box<dyn VisibilityTx>>;

    /// Students that may currently see `material_id`.
    async fn student_ids(&self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>>;

    /// The subset of `candidates` that `student_id` may see.
    async fn visible_among(
        &self,
        student_id: StudentId,
        candidates: &[MaterialId],
    ) -> AppResult<HashSet<MaterialId>>;
}

/// A single access-change transaction.
///
/// Dropping the transaction without calling [`VisibilityTx::commit`]
/// rolls every write back.
#[async_trait]
pub trait VisibilityTx: Send {
    /// Edges from `id` up to its tree root, read inside the transaction.
    async fn ancestry_links(&mut self, id: MaterialId) -> AppResult<Vec<TreeLink>>;

    /// Edges of the subtree rooted at `root`, read inside the transaction.
    async fn subtree_links(&mut self, root: MaterialId) -> AppResult<Vec<TreeLink>>;

    /// Serialize writers on the tree rooted at `tree_root` until commit.
    /// Called once per transaction, before any write.
    async fn lock_tree(&mut self, tree_root: MaterialId) -> AppResult<()>;

    /// Students granted on `material_id`.
    async fn student_ids(&mut self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>>;

    /// Grant every student on every material. Existing pairs are kept.
    /// Returns the number of new pairs.
    async fn grant(&mut self, materials: &[MaterialId], students: &[StudentId]) -> AppResult<u64>;

    /// Remove every (material, student) pair. Returns the number removed.
    async fn revoke(&mut self, materials: &[MaterialId], students: &[StudentId])
    -> AppResult<u64>;

    /// Make all writes durable.
    async fn commit(&mut self) -> AppResult<()>;
}

/// Read-only view of teachers, courses, groups, and students.
#[async_trait]
pub trait Directory: Send + Sync + Debug + 'static {
    /// Whether a teacher with this ID exists.
    async fn teacher_exists(&self, teacher_id: TeacherId) -> AppResult<bool>;

    /// The student profile attached to a user account, if any.
    async fn student_for_user(&self, user_id: UserId) -> AppResult<Option<StudentId>>;

    /// The teacher's courses, groups, and students as flat outer-join rows,
    /// ordered by course, group, then student name.
    async fn roster_for_teacher(&self, teacher_id: TeacherId) -> AppResult<Vec<RosterEntry>>;
}
