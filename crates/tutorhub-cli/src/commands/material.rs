//! Material tree inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tutorhub_core::error::AppError;
use tutorhub_core::types::{ExtensionFilter, MaterialId, MaterialOrder, TeacherId};
use tutorhub_entity::material::Material;
use tutorhub_service::material::{ListingQuery, MaterialListingService, MaterialNode, TreeNavigator};

/// Arguments for material commands
#[derive(Debug, Args)]
pub struct MaterialArgs {
    /// Material subcommand
    #[command(subcommand)]
    pub command: MaterialCommand,
}

/// Material subcommands
#[derive(Debug, Subcommand)]
pub enum MaterialCommand {
    /// List the contents of a folder (roots when no parent is given)
    List {
        /// Parent folder ID
        #[arg(short, long)]
        parent_id: Option<i64>,
        /// Only roots owned by this teacher
        #[arg(short, long)]
        teacher_id: Option<i64>,
        /// newest, oldest, or alphabetical
        #[arg(short, long)]
        order: Option<String>,
        /// Comma-separated file extensions
        #[arg(short, long)]
        extensions: Option<String>,
    },
    /// Show a material and everything below it
    Tree {
        /// Material ID
        id: i64,
    },
}

/// Material display row
#[derive(Debug, Serialize, Tabled)]
struct MaterialRow {
    /// Material ID
    id: i64,
    /// Name, indented by depth in tree output
    name: String,
    /// folder or file
    kind: String,
    /// Owning teacher
    teacher_id: i64,
    /// Created at
    created_at: String,
}

impl MaterialRow {
    fn new(material: &Material, depth: usize) -> Self {
        Self {
            id: material.id.get(),
            name: format!("{}{}", "  ".repeat(depth), material.name),
            kind: material.kind.to_string(),
            teacher_id: material.owner_teacher_id.get(),
            created_at: material.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn flatten(node: &MaterialNode, depth: usize, rows: &mut Vec<MaterialRow>) {
    rows.push(MaterialRow::new(&node.material, depth));
    for child in &node.children {
        flatten(child, depth + 1, rows);
    }
}

fn material_id(raw: i64) -> Result<MaterialId, AppError> {
    MaterialId::positive(raw)
        .ok_or_else(|| AppError::validation(format!("Invalid material id: {raw}")))
}

/// Execute material commands
pub async fn execute(
    args: &MaterialArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let stores = super::open_stores(config_path).await?;

    match &args.command {
        MaterialCommand::List {
            parent_id,
            teacher_id,
            order,
            extensions,
        } => {
            let owner = teacher_id
                .map(|raw| {
                    TeacherId::positive(raw)
                        .ok_or_else(|| AppError::validation(format!("Invalid teacher id: {raw}")))
                })
                .transpose()?;
            let query = ListingQuery {
                parent_id: parent_id.map(material_id).transpose()?,
                order: MaterialOrder::from_query(order.as_deref()),
                extensions: ExtensionFilter::from_query(extensions.as_deref()),
                owner,
            };

            let listing = MaterialListingService::new(
                stores.materials.clone(),
                stores.visibility.clone(),
                stores.directory.clone(),
            );
            let materials = listing.list_children(&query).await?;

            match format {
                OutputFormat::Json => output::print_json(&materials),
                OutputFormat::Table => {
                    let rows: Vec<MaterialRow> =
                        materials.iter().map(|m| MaterialRow::new(m, 0)).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        MaterialCommand::Tree { id } => {
            let navigator = TreeNavigator::new(stores.materials.clone());
            let tree = navigator.load_tree(material_id(*id)?).await?;

            match format {
                OutputFormat::Json => output::print_json(&tree),
                OutputFormat::Table => {
                    let mut rows = Vec::with_capacity(tree.size());
                    flatten(&tree, 0, &mut rows);
                    output::print_list(&rows, format);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tutorhub_entity::material::MaterialKind;

    fn material(id: i64, parent: Option<i64>, name: &str) -> Material {
        Material {
            id: MaterialId::new(id),
            name: name.to_string(),
            kind: MaterialKind::Folder,
            parent_id: parent.map(MaterialId::new),
            owner_teacher_id: TeacherId::new(1),
            storage_locator: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_flatten_indents_by_depth() {
        let tree = MaterialNode {
            material: material(1, None, "Course"),
            children: vec![MaterialNode {
                material: material(2, Some(1), "Week 1"),
                children: vec![MaterialNode {
                    material: material(3, Some(2), "Quiz"),
                    children: vec![],
                }],
            }],
        };

        let mut rows = Vec::new();
        flatten(&tree, 0, &mut rows);

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Course", "  Week 1", "    Quiz"]);
    }
}
