//! Ancestor and descendant traversal over the materials forest.
//!
//! Traversals fetch the relevant edges in one store call and walk them in
//! memory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::MaterialId;
use tutorhub_database::store::MaterialStore;
use tutorhub_entity::material::{Material, TreeLink};

/// Ancestor ids of `start`, nearest parent first, ending at the root.
/// Empty for a root or for a node absent from `links`.
pub fn ancestor_chain(start: MaterialId, links: &[TreeLink]) -> AppResult<Vec<MaterialId>> {
    let parents: HashMap<MaterialId, Option<MaterialId>> =
        links.iter().map(|link| (link.id, link.parent_id)).collect();

    let mut chain = Vec::new();
    let mut seen = HashSet::from([start]);
    let mut cursor = parents.get(&start).copied().flatten();

    while let Some(parent) = cursor {
        if !seen.insert(parent) {
            return Err(AppError::internal(format!(
                "Cycle detected in material tree at {parent}"
            )));
        }
        chain.push(parent);
        cursor = parents.get(&parent).copied().flatten();
    }
    Ok(chain)
}

/// `root` and all of its descendants, in depth-first pre-order.
/// Siblings are visited in the order their edges appear in `links`.
pub fn descendants_of(root: MaterialId, links: &[TreeLink]) -> Vec<MaterialId> {
    let mut children: HashMap<MaterialId, Vec<MaterialId>> = HashMap::new();
    for link in links {
        if let Some(parent) = link.parent_id {
            children.entry(parent).or_default().push(link.id);
        }
    }

    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        order.push(node);
        if let Some(kids) = children.get(&node) {
            stack.extend(kids.iter().rev());
        }
    }
    order
}

/// A material together with its nested children.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialNode {
    /// The material itself.
    #[serde(flatten)]
    pub material: Material,
    /// Child nodes in insertion order.
    #[serde(rename = "Children")]
    pub children: Vec<MaterialNode>,
}

impl MaterialNode {
    /// Number of nodes in this subtree, the node included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(MaterialNode::size).sum::<usize>()
    }
}

/// Tree traversals backed by a [`MaterialStore`].
///
/// Each call reads committed state outside any transaction. The access
/// engine needs edges read under its tree lock, so it applies
/// [`ancestor_chain`] and [`descendants_of`] to links fetched through its
/// own transaction instead.
#[derive(Debug, Clone)]
pub struct TreeNavigator {
    /// Material store.
    materials: Arc<dyn MaterialStore>,
}

impl TreeNavigator {
    /// Creates a new tree navigator.
    pub fn new(materials: Arc<dyn MaterialStore>) -> Self {
        Self { materials }
    }

    /// Ancestor ids of a material, nearest parent first.
    pub async fn ancestor_chain(&self, material_id: MaterialId) -> AppResult<Vec<MaterialId>> {
        let links = self.materials.ancestry_links(material_id).await?;
        if links.is_empty() {
            return Err(AppError::not_found(format!(
                "Material {material_id} not found"
            )));
        }
        ancestor_chain(material_id, &links)
    }

    /// A material and all of its descendants.
    pub async fn descendants_of(&self, material_id: MaterialId) -> AppResult<Vec<MaterialId>> {
        let links = self.materials.subtree_links(material_id).await?;
        if links.is_empty() {
            return Err(AppError::not_found(format!(
                "Material {material_id} not found"
            )));
        }
        Ok(descendants_of(material_id, &links))
    }

    /// Load the full subtree under a material as nested nodes, from one
    /// store fetch.
    pub async fn load_tree(&self, material_id: MaterialId) -> AppResult<MaterialNode> {
        let rows = self.materials.subtree(material_id).await?;

        let mut root = None;
        let mut by_parent: HashMap<MaterialId, Vec<Material>> = HashMap::new();
        for material in rows {
            if material.id == material_id {
                root = Some(material);
            } else if let Some(parent) = material.parent_id {
                by_parent.entry(parent).or_default().push(material);
            }
        }

        let root = root
            .ok_or_else(|| AppError::not_found(format!("Material {material_id} not found")))?;
        Ok(assemble(root, &mut by_parent))
    }
}

fn assemble(material: Material, by_parent: &mut HashMap<MaterialId, Vec<Material>>) -> MaterialNode {
    let children = by_parent
        .remove(&material.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| assemble(child, by_parent))
        .collect();
    MaterialNode { material, children }
}
