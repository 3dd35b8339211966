//! # tutorhub-entity
//!
//! Domain entity models for the TutorHub materials library. Database
//! entities derive `sqlx::FromRow`; the report types are the JSON shapes
//! returned to the access-editing UI.

pub mod directory;
pub mod material;
pub mod visibility;
