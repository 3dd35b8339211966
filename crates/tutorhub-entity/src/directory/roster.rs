//! Flattened roster row.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tutorhub_core::types::{CourseId, GroupId, StudentId, UserId};

use crate::visibility::StudentAccess;

/// One row of a teacher's roster: a course, optionally one of its groups,
/// optionally one student of that group (outer-join shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RosterEntry {
    /// Course ID.
    pub course_id: CourseId,
    /// Course name.
    pub course_name: String,
    /// Group ID, if the course has groups.
    pub group_id: Option<GroupId>,
    /// Group name.
    pub group_name: Option<String>,
    /// Student ID, if the group has students.
    pub student_id: Option<StudentId>,
    /// The student's user account.
    pub user_id: Option<UserId>,
    /// Student first name.
    pub first_name: Option<String>,
    /// Student last name.
    pub last_name: Option<String>,
}

impl RosterEntry {
    /// The student part of the row, without the access flag set.
    pub fn student(&self) -> Option<StudentAccess> {
        Some(StudentAccess {
            student_id: self.student_id?,
            user_id: self.user_id?,
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            has_access_to_material: false,
        })
    }
}
