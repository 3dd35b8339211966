//! Material entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, TeacherId};

/// Longest material name accepted.
pub const MAX_NAME_LEN: usize = 255;

/// Whether a material is a container or a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "material_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    /// A folder that may hold other materials.
    Folder,
    /// A file backed by a blob in storage.
    File,
}

impl MaterialKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MaterialKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            _ => Err(AppError::validation(format!("Invalid material kind: '{s}'"))),
        }
    }
}

/// A node in a teacher's materials tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Material {
    /// Unique material identifier.
    pub id: MaterialId,
    /// Display name (file name for files).
    pub name: String,
    /// Folder or file.
    pub kind: MaterialKind,
    /// Parent folder (None for roots).
    pub parent_id: Option<MaterialId>,
    /// The teacher who owns the material.
    #[serde(rename = "TeacherId")]
    pub owner_teacher_id: TeacherId,
    /// Where the blob lives. Set for files only.
    pub storage_locator: Option<String>,
    /// When the material was created.
    pub created_at: DateTime<Utc>,
    /// When the material was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == MaterialKind::Folder
    }

    /// The parent/child edge this node contributes to its tree.
    pub fn link(&self) -> TreeLink {
        TreeLink {
            id: self.id,
            parent_id: self.parent_id,
        }
    }
}

/// Data required to create a new material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterial {
    /// Display name.
    pub name: String,
    /// Folder or file.
    pub kind: MaterialKind,
    /// Parent folder (None for a root).
    pub parent_id: Option<MaterialId>,
    /// Owning teacher.
    pub owner_teacher_id: TeacherId,
    /// Blob locator (files only).
    pub storage_locator: Option<String>,
}

impl NewMaterial {
    /// Check name and kind/locator consistency.
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;

        let has_locator = self
            .storage_locator
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty());

        match (self.kind, has_locator) {
            (MaterialKind::File, false) => Err(AppError::validation(
                "A file material requires a storage locator",
            )),
            (MaterialKind::Folder, true) => Err(AppError::validation(
                "A folder material cannot have a storage locator",
            )),
            _ => Ok(()),
        }
    }
}

/// Check a material name for emptiness and length.
pub fn validate_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Material name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Material name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// A single parent/child edge, the unit tree traversals are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct TreeLink {
    /// The node.
    pub id: MaterialId,
    /// Its parent, if any.
    pub parent_id: Option<MaterialId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorhub_core::error::ErrorKind;

    fn new_material(kind: MaterialKind, locator: Option<&str>) -> NewMaterial {
        NewMaterial {
            name: "Week 1".to_string(),
            kind,
            parent_id: None,
            owner_teacher_id: TeacherId::new(1),
            storage_locator: locator.map(String::from),
        }
    }

    #[test]
    fn test_folder_without_locator_is_valid() {
        assert!(new_material(MaterialKind::Folder, None).validate().is_ok());
    }

    #[test]
    fn test_file_requires_locator() {
        let err = new_material(MaterialKind::File, None).validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let blank = new_material(MaterialKind::File, Some("  ")).validate();
        assert!(blank.is_err());
        assert!(new_material(MaterialKind::File, Some("/files/a.pdf")).validate().is_ok());
    }

    #[test]
    fn test_folder_rejects_locator() {
        let err = new_material(MaterialKind::Folder, Some("/files/a.pdf"))
            .validate()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name("Algebra").is_ok());
    }

    #[test]
    fn test_kind_parse_and_json() {
        assert_eq!("Folder".parse::<MaterialKind>().unwrap(), MaterialKind::Folder);
        assert!("link".parse::<MaterialKind>().is_err());
        assert_eq!(
            serde_json::to_string(&MaterialKind::File).unwrap(),
            "\"file\""
        );
    }

    #[test]
    fn test_material_json_shape() {
        let material = Material {
            id: MaterialId::new(5),
            name: "notes.pdf".to_string(),
            kind: MaterialKind::File,
            parent_id: Some(MaterialId::new(2)),
            owner_teacher_id: TeacherId::new(9),
            storage_locator: Some("/files/notes.pdf".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&material).unwrap();
        assert_eq!(json["Id"], 5);
        assert_eq!(json["ParentId"], 2);
        assert_eq!(json["TeacherId"], 9);
        assert_eq!(json["Kind"], "file");
    }
}
