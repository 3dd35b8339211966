//! Access propagation: applying a desired student set to a material, its
//! subtree, and (for additions) its ancestors.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, StudentId};
use tutorhub_database::store::VisibilityStore;

use super::ids::parse_student_ids;
use crate::material::tree::{ancestor_chain, descendants_of};

/// Students to grant and revoke, computed against a material's own grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessDiff {
    /// `desired - current`.
    pub to_add: BTreeSet<StudentId>,
    /// `current - desired`.
    pub to_remove: BTreeSet<StudentId>,
}

impl AccessDiff {
    /// Diff a material's current grant set against the desired one.
    pub fn between(current: &BTreeSet<StudentId>, desired: &BTreeSet<StudentId>) -> Self {
        Self {
            to_add: desired.difference(current).copied().collect(),
            to_remove: current.difference(desired).copied().collect(),
        }
    }

    /// Whether applying the diff would change nothing.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Outcome of a `set_access` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessChange {
    /// The material the change was requested on.
    pub material_id: MaterialId,
    /// Students newly granted.
    pub added: Vec<StudentId>,
    /// Students revoked.
    pub removed: Vec<StudentId>,
    /// Materials in the cascaded subtree (0 when nothing changed).
    pub subtree_size: usize,
    /// Ancestors that received additions.
    pub ancestors_updated: usize,
    /// Grant rows inserted.
    pub rows_granted: u64,
    /// Grant rows deleted.
    pub rows_revoked: u64,
}

impl AccessChange {
    fn unchanged(material_id: MaterialId) -> Self {
        Self {
            material_id,
            added: Vec::new(),
            removed: Vec::new(),
            subtree_size: 0,
            ancestors_updated: 0,
            rows_granted: 0,
            rows_revoked: 0,
        }
    }

    /// Whether the call left persisted state untouched.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Human-readable summary for API responses.
    pub fn summary(&self) -> String {
        if self.is_noop() {
            format!("Access to material {} is unchanged", self.material_id)
        } else {
            format!(
                "Access to material {} updated: {} student(s) granted, {} student(s) revoked",
                self.material_id,
                self.added.len(),
                self.removed.len()
            )
        }
    }
}

/// Applies visibility changes across a material's subtree and ancestors.
///
/// The only writer of visibility grants besides inheritance-on-create.
#[derive(Debug, Clone)]
pub struct AccessPropagationEngine {
    /// Visibility store.
    visibility: Arc<dyn VisibilityStore>,
}

impl AccessPropagationEngine {
    /// Creates a new propagation engine.
    pub fn new(visibility: Arc<dyn VisibilityStore>) -> Self {
        Self { visibility }
    }

    /// Parse a raw JSON id list, then apply it with [`Self::set_access`].
    pub async fn set_access_json(
        &self,
        material_id: MaterialId,
        payload: &Value,
    ) -> AppResult<AccessChange> {
        let desired = parse_student_ids(payload)?;
        self.set_access(material_id, &desired).await
    }

    /// Make `desired` the explicit student set of `material_id`.
    ///
    /// The diff against the material's own grants is applied uniformly to
    /// every node of its subtree. Additions are also granted on every
    /// ancestor; removals never touch ancestors. Runs in one transaction
    /// holding the tree lock, so a failure at any step leaves no trace.
    pub async fn set_access(
        &self,
        material_id: MaterialId,
        desired: &BTreeSet<StudentId>,
    ) -> AppResult<AccessChange> {
        let mut tx = self.visibility.begin().await?;

        let tree_root = {
            let ancestry = tx.ancestry_links(material_id).await?;
            if ancestry.is_empty() {
                return Err(AppError::not_found(format!(
                    "Material {material_id} not found"
                )));
            }
            ancestor_chain(material_id, &ancestry)?
                .last()
                .copied()
                .unwrap_or(material_id)
        };
        tx.lock_tree(tree_root).await?;

        // Parents never change, but the material may have been deleted
        // while this call waited for the lock.
        let ancestry = tx.ancestry_links(material_id).await?;
        if ancestry.is_empty() {
            return Err(AppError::not_found(format!(
                "Material {material_id} not found"
            )));
        }
        let ancestors = ancestor_chain(material_id, &ancestry)?;

        let current = tx.student_ids(material_id).await?;
        let diff = AccessDiff::between(&current, desired);
        if diff.is_empty() {
            tx.commit().await?;
            debug!(material_id = %material_id, "Access unchanged, nothing to apply");
            return Ok(AccessChange::unchanged(material_id));
        }

        let subtree_links = tx.subtree_links(material_id).await?;
        let subtree = descendants_of(material_id, &subtree_links);
        let to_add: Vec<StudentId> = diff.to_add.iter().copied().collect();
        let to_remove: Vec<StudentId> = diff.to_remove.iter().copied().collect();

        let rows_revoked = tx.revoke(&subtree, &to_remove).await?;
        let mut rows_granted = tx.grant(&subtree, &to_add).await?;

        let ancestors_updated = if to_add.is_empty() {
            0
        } else {
            rows_granted += tx.grant(&ancestors, &to_add).await?;
            ancestors.len()
        };

        tx.commit().await?;

        info!(
            material_id = %material_id,
            tree_root = %tree_root,
            added = to_add.len(),
            removed = to_remove.len(),
            subtree_size = subtree.len(),
            ancestors_updated,
            rows_granted,
            rows_revoked,
            "Material access updated"
        );

        Ok(AccessChange {
            material_id,
            added: to_add,
            removed: to_remove,
            subtree_size: subtree.len(),
            ancestors_updated,
            rows_granted,
            rows_revoked,
        })
    }
}
