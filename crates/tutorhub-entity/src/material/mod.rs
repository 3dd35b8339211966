//! Material (folder/file tree node) entities.

pub mod model;

pub use model::{Material, MaterialKind, NewMaterial, TreeLink, validate_name};
