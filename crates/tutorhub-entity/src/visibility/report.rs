//! Access report: a teacher's roster annotated with explicit grants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tutorhub_core::types::{CourseId, GroupId, MaterialId, StudentId, TeacherId, UserId};

use crate::directory::RosterEntry;

/// Roster of the material owner's courses with a per-student flag telling
/// whether the student holds an explicit grant on this exact material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessReport {
    /// The material the report is about.
    pub material_id: MaterialId,
    /// The teacher owning the material.
    pub teacher_id: TeacherId,
    /// The teacher's courses.
    pub courses: Vec<CourseAccess>,
}

/// One course in an [`AccessReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CourseAccess {
    /// Course ID.
    pub course_id: CourseId,
    /// Course name.
    pub course_name: String,
    /// Groups in the course.
    pub groups: Vec<GroupAccess>,
}

/// One group in a [`CourseAccess`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupAccess {
    /// Group ID.
    pub group_id: GroupId,
    /// Group name.
    pub group_name: String,
    /// Students enrolled in the group.
    pub students: Vec<StudentAccess>,
}

/// One student line in a [`GroupAccess`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StudentAccess {
    /// Student ID.
    pub student_id: StudentId,
    /// The student's user account.
    pub user_id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Explicit grant on this exact material (ancestors not considered).
    #[serde(rename = "hasAccessToMaterial")]
    pub has_access_to_material: bool,
}

impl AccessReport {
    /// Group flat roster rows into courses and groups.
    ///
    /// Courses and groups keep the order in which they first appear in
    /// `roster`; students keep row order within their group.
    pub fn build(
        material_id: MaterialId,
        teacher_id: TeacherId,
        roster: &[RosterEntry],
        granted: &BTreeSet<StudentId>,
    ) -> Self {
        let mut courses: Vec<CourseAccess> = Vec::new();

        for row in roster {
            let course_idx = match courses.iter().position(|c| c.course_id == row.course_id) {
                Some(idx) => idx,
                None => {
                    courses.push(CourseAccess {
                        course_id: row.course_id,
                        course_name: row.course_name.clone(),
                        groups: Vec::new(),
                    });
                    courses.len() - 1
                }
            };
            let course = &mut courses[course_idx];

            let Some(group_id) = row.group_id else {
                continue;
            };

            let group_idx = match course.groups.iter().position(|g| g.group_id == group_id) {
                Some(idx) => idx,
                None => {
                    course.groups.push(GroupAccess {
                        group_id,
                        group_name: row.group_name.clone().unwrap_or_default(),
                        students: Vec::new(),
                    });
                    course.groups.len() - 1
                }
            };

            if let Some(student) = row.student() {
                let has_access_to_material = granted.contains(&student.student_id);
                course.groups[group_idx].students.push(StudentAccess {
                    has_access_to_material,
                    ..student
                });
            }
        }

        Self {
            material_id,
            teacher_id,
            courses,
        }
    }

    /// Total number of student lines in the report.
    pub fn student_count(&self) -> usize {
        self.courses
            .iter()
            .flat_map(|c| &c.groups)
            .map(|g| g.students.len())
            .sum()
    }
}
