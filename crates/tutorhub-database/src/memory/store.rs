//! In-memory material and visibility store.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, StudentId, TeacherId};
use tutorhub_entity::material::{Material, NewMaterial, TreeLink};

use crate::store::{MaterialStore, VisibilityStore, VisibilityTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    materials: BTreeMap<MaterialId, Material>,
    grants: BTreeSet<(MaterialId, StudentId)>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing creation timestamps keep "newest first" stable.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(stamp);
        stamp
    }

    fn ancestry_links(&self, id: MaterialId) -> Vec<TreeLink> {
        let mut links = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = self.materials.get(&id);
        while let Some(material) = cursor {
            if !seen.insert(material.id) {
                break;
            }
            links.push(material.link());
            cursor = material.parent_id.and_then(|p| self.materials.get(&p));
        }
        links
    }

    fn subtree_links(&self, root: MaterialId) -> Vec<TreeLink> {
        let Some(root) = self.materials.get(&root) else {
            return Vec::new();
        };
        let mut links = vec![root.link()];
        let mut seen: HashSet<MaterialId> = HashSet::from([root.id]);
        let mut frontier = vec![root.id];
        while let Some(current) = frontier.pop() {
            for child in self
                .materials
                .values()
                .filter(|m| m.parent_id == Some(current))
            {
                if seen.insert(child.id) {
                    links.push(child.link());
                    frontier.push(child.id);
                }
            }
        }
        links.sort_by_key(|link| link.id);
        links
    }

    fn student_ids(&self, material_id: MaterialId) -> BTreeSet<StudentId> {
        self.grants
            .range((material_id, StudentId::new(i64::MIN))..=(material_id, StudentId::new(i64::MAX)))
            .map(|(_, student)| *student)
            .collect()
    }
}

/// Material and visibility store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of grant rows, across all materials.
    pub async fn grant_count(&self) -> usize {
        self.state.lock().await.grants.len()
    }
}

#[async_trait]
impl MaterialStore for MemoryStore {
    async fn create(&self, new: &NewMaterial) -> AppResult<Material> {
        new.validate()?;
        let mut state = self.state.lock().await;

        if let Some(parent_id) = new.parent_id {
            let parent = state.materials.get(&parent_id).ok_or_else(|| {
                AppError::not_found(format!("Parent material {parent_id} not found"))
            })?;
            if !parent.is_folder() {
                return Err(AppError::validation(format!(
                    "Parent material {parent_id} is not a folder"
                )));
            }
        }

        state.next_id += 1;
        let id = MaterialId::new(state.next_id);
        let created_at = state.next_timestamp();
        let material = Material {
            id,
            name: new.name.trim().to_string(),
            kind: new.kind,
            parent_id: new.parent_id,
            owner_teacher_id: new.owner_teacher_id,
            storage_locator: new.storage_locator.clone(),
            created_at,
            updated_at: created_at,
        };
        state.materials.insert(id, material.clone());

        if let Some(parent_id) = new.parent_id {
            for student in state.student_ids(parent_id) {
                state.grants.insert((id, student));
            }
        }
        Ok(material)
    }

    async fn find_by_id(&self, id: MaterialId) -> AppResult<Option<Material>> {
        Ok(self.state.lock().await.materials.get(&id).cloned())
    }

    async fn list_children(
        &self,
        parent_id: Option<MaterialId>,
        owner: Option<TeacherId>,
    ) -> AppResult<Vec<Material>> {
        let state = self.state.lock().await;
        Ok(state
            .materials
            .values()
            .filter(|m| m.parent_id == parent_id)
            .filter(|m| owner.is_none_or(|o| m.owner_teacher_id == o))
            .cloned()
            .collect())
    }

    async fn rename(&self, id: MaterialId, name: &str) -> AppResult<Material> {
        let mut state = self.state.lock().await;
        let material = state
            .materials
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Material {id} not found")))?;
        material.name = name.trim().to_string();
        material.updated_at = Utc::now();
        Ok(material.clone())
    }

    async fn delete_subtree(&self, id: MaterialId) -> AppResult<Vec<Material>> {
        let mut state = self.state.lock().await;
        let links = state.subtree_links(id);
        if links.is_empty() {
            return Err(AppError::not_found(format!("Material {id} not found")));
        }
        let doomed: HashSet<MaterialId> = links.iter().map(|link| link.id).collect();
        let removed = links
            .iter()
            .filter_map(|link| state.materials.remove(&link.id))
            .collect();
        state.grants.retain(|(material, _)| !doomed.contains(material));
        Ok(removed)
    }

    async fn subtree_links(&self, root: MaterialId) -> AppResult<Vec<TreeLink>> {
        Ok(self.state.lock().await.subtree_links(root))
    }

    async fn subtree(&self, root: MaterialId) -> AppResult<Vec<Material>> {
        let state = self.state.lock().await;
        Ok(state
            .subtree_links(root)
            .iter()
            .filter_map(|link| state.materials.get(&link.id).cloned())
            .collect())
    }

    async fn ancestry_links(&self, id: MaterialId) -> AppResult<Vec<TreeLink>> {
        Ok(self.state.lock().await.ancestry_links(id))
    }
}

#[async_trait]
impl VisibilityStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn VisibilityTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTx {
            guard: Some(guard),
            working,
        }))
    }

    async fn student_ids(&self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>> {
        Ok(self.state.lock().await.student_ids(material_id))
    }

    async fn visible_among(
        &self,
        student_id: StudentId,
        candidates: &[MaterialId],
    ) -> AppResult<HashSet<MaterialId>> {
        let state = self.state.lock().await;
        Ok(candidates
            .iter()
            .copied()
            .filter(|id| state.grants.contains(&(*id, student_id)))
            .collect())
    }
}

/// Exclusive working copy of the store state. Dropping it discards the copy.
struct MemoryTx {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    working: MemoryState,
}

impl MemoryTx {
    fn ensure_open(&self) -> AppResult<()> {
        if self.guard.is_some() {
            Ok(())
        } else {
            Err(AppError::internal("Access transaction already finished"))
        }
    }
}

#[async_trait]
impl VisibilityTx for MemoryTx {
    async fn ancestry_links(&mut self, id: MaterialId) -> AppResult<Vec<TreeLink>> {
        self.ensure_open()?;
        Ok(self.working.ancestry_links(id))
    }

    async fn subtree_links(&mut self, root: MaterialId) -> AppResult<Vec<TreeLink>> {
        self.ensure_open()?;
        Ok(self.working.subtree_links(root))
    }

    async fn lock_tree(&mut self, _tree_root: MaterialId) -> AppResult<()> {
        // The state mutex is already held for the whole transaction.
        self.ensure_open()
    }

    async fn student_ids(&mut self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>> {
        self.ensure_open()?;
        Ok(self.working.student_ids(material_id))
    }

    async fn grant(&mut self, materials: &[MaterialId], students: &[StudentId]) -> AppResult<u64> {
        self.ensure_open()?;
        let mut added = 0;
        for material in materials {
            if !self.working.materials.contains_key(material) {
                return Err(AppError::database(format!(
                    "Material {material} does not exist"
                )));
            }
            for student in students {
                if self.working.grants.insert((*material, *student)) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    async fn revoke(
        &mut self,
        materials: &[MaterialId],
        students: &[StudentId],
    ) -> AppResult<u64> {
        self.ensure_open()?;
        let mut removed = 0;
        for material in materials {
            for student in students {
                if self.working.grants.remove(&(*material, *student)) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn commit(&mut self) -> AppResult<()> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| AppError::internal("Access transaction already finished"))?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorhub_core::error::ErrorKind;
    use tutorhub_entity::material::MaterialKind;

    fn folder(name: &str, parent_id: Option<MaterialId>) -> NewMaterial {
        NewMaterial {
            name: name.to_string(),
            kind: MaterialKind::Folder,
            parent_id,
            owner_teacher_id: TeacherId::new(1),
            storage_locator: None,
        }
    }

    fn file(name: &str, parent_id: Option<MaterialId>) -> NewMaterial {
        NewMaterial {
            name: name.to_string(),
            kind: MaterialKind::File,
            parent_id,
            owner_teacher_id: TeacherId::new(1),
            storage_locator: Some(format!("/files/{name}")),
        }
    }

    fn students(ids: &[i64]) -> Vec<StudentId> {
        ids.iter().copied().map(StudentId::new).collect()
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_lists_in_insertion_order() {
        let store = MemoryStore::new();
        let root = store.create(&folder("Algebra", None)).await.unwrap();
        let b = store.create(&file("b.pdf", Some(root.id))).await.unwrap();
        let a = store.create(&file("a.pdf", Some(root.id))).await.unwrap();

        let children = store.list_children(Some(root.id), None).await.unwrap();
        let ids: Vec<_> = children.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert!(a.created_at > b.created_at);

        let roots = store.list_children(None, None).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert!(store
            .list_children(None, Some(TeacherId::new(2)))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_or_file_parent() {
        let store = MemoryStore::new();
        let err = store
            .create(&folder("Orphan", Some(MaterialId::new(42))))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let leaf = store.create(&file("a.pdf", None)).await.unwrap();
        let err = store
            .create(&file("b.pdf", Some(leaf.id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_child_inherits_parent_grants() {
        let store = MemoryStore::new();
        let root = store.create(&folder("Root", None)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.grant(&[root.id], &students(&[1, 2])).await.unwrap();
        tx.commit().await.unwrap();

        let child = store.create(&file("notes.pdf", Some(root.id))).await.unwrap();
        let granted = VisibilityStore::student_ids(&store, child.id).await.unwrap();
        assert_eq!(granted, students(&[1, 2]).into_iter().collect::<BTreeSet<_>>());
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        let root = store.create(&folder("Root", None)).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            assert_eq!(tx.grant(&[root.id], &students(&[7])).await.unwrap(), 1);
        }

        assert_eq!(store.grant_count().await, 0);
    }

    #[tokio::test]
    async fn test_grant_and_revoke_count_changed_pairs() {
        let store = MemoryStore::new();
        let root = store.create(&folder("Root", None)).await.unwrap();
        let child = store.create(&folder("Child", Some(root.id))).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.grant(&[root.id, child.id], &students(&[1, 2])).await.unwrap(), 4);
        assert_eq!(tx.grant(&[root.id], &students(&[1])).await.unwrap(), 0);
        assert_eq!(tx.revoke(&[child.id], &students(&[2, 3])).await.unwrap(), 1);
        tx.commit().await.unwrap();
        assert!(tx.commit().await.is_err());

        assert_eq!(store.grant_count().await, 3);
        let visible = store
            .visible_among(StudentId::new(2), &[root.id, child.id])
            .await
            .unwrap();
        assert_eq!(visible, HashSet::from([root.id]));
    }

    #[tokio::test]
    async fn test_tree_links_and_delete_subtree() {
        let store = MemoryStore::new();
        let root = store.create(&folder("Root", None)).await.unwrap();
        let mid = store.create(&folder("Mid", Some(root.id))).await.unwrap();
        let leaf = store.create(&file("leaf.pdf", Some(mid.id))).await.unwrap();

        let chain = store.ancestry_links(leaf.id).await.unwrap();
        let chain_ids: Vec<_> = chain.iter().map(|l| l.id).collect();
        assert_eq!(chain_ids, vec![leaf.id, mid.id, root.id]);

        let subtree = store.subtree_links(mid.id).await.unwrap();
        assert_eq!(subtree.len(), 2);

        let mut tx = store.begin().await.unwrap();
        tx.grant(&[mid.id, leaf.id], &students(&[5])).await.unwrap();
        tx.commit().await.unwrap();

        let removed = store.delete_subtree(mid.id).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(store.grant_count().await, 0);
        assert!(store.find_by_id(leaf.id).await.unwrap().is_none());
        assert!(store.find_by_id(root.id).await.unwrap().is_some());

        let err = store.delete_subtree(mid.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_missing_material() {
        let store = MemoryStore::new();
        let err = store.rename(MaterialId::new(9), "New").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
