//! Visibility grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tutorhub_core::types::{MaterialId, StudentId};

/// An explicit fact that a student may see one exact material node.
///
/// At most one grant exists per `(material_id, student_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VisibilityGrant {
    /// The material the grant applies to.
    pub material_id: MaterialId,
    /// The student who may see it.
    pub student_id: StudentId,
    /// When the grant was written.
    pub granted_at: DateTime<Utc>,
}
