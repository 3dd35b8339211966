//! Directory repository: teachers, courses, groups, and students.

use async_trait::async_trait;
use sqlx::PgPool;

use tutorhub_core::result::AppResult;
use tutorhub_core::types::{StudentId, TeacherId, UserId};
use tutorhub_entity::directory::RosterEntry;

use super::db_error;
use crate::store::Directory;

/// Read-only queries over the course directory tables.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for DirectoryRepository {
    async fn teacher_exists(&self, teacher_id: TeacherId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)")
            .bind(teacher_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to look up teacher"))
    }

    async fn student_for_user(&self, user_id: UserId) -> AppResult<Option<StudentId>> {
        sqlx::query_scalar::<_, StudentId>("SELECT id FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to look up student"))
    }

    async fn roster_for_teacher(&self, teacher_id: TeacherId) -> AppResult<Vec<RosterEntry>> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT c.id AS course_id, c.name AS course_name, \
                    g.id AS group_id, g.name AS group_name, \
                    s.id AS student_id, s.user_id, s.first_name, s.last_name \
             FROM courses c \
             LEFT JOIN study_groups g ON g.course_id = c.id \
             LEFT JOIN group_students gs ON gs.group_id = g.id \
             LEFT JOIN students s ON s.id = gs.student_id \
             WHERE c.teacher_id = $1 \
             ORDER BY c.id, g.id, s.last_name, s.first_name, s.id",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load teacher roster"))
    }
}
