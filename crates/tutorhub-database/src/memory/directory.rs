//! In-memory course directory, assembled with builder methods.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use tutorhub_core::result::AppResult;
use tutorhub_core::types::{CourseId, GroupId, StudentId, TeacherId, UserId};
use tutorhub_entity::directory::RosterEntry;

use crate::store::Directory;

#[derive(Debug, Clone)]
struct StudentProfile {
    user_id: UserId,
    first_name: String,
    last_name: String,
}

/// Immutable directory snapshot for tests and database-less runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    teachers: BTreeSet<TeacherId>,
    students: BTreeMap<StudentId, StudentProfile>,
    courses: BTreeMap<CourseId, (TeacherId, String)>,
    groups: BTreeMap<GroupId, (CourseId, String)>,
    members: BTreeSet<(GroupId, StudentId)>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teacher.
    pub fn with_teacher(mut self, teacher_id: TeacherId) -> Self {
        self.teachers.insert(teacher_id);
        self
    }

    /// Register a student profile attached to a user account.
    pub fn with_student(
        mut self,
        student_id: StudentId,
        user_id: UserId,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        self.students.insert(
            student_id,
            StudentProfile {
                user_id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        self
    }

    /// Register a course taught by `teacher_id`.
    pub fn with_course(mut self, course_id: CourseId, teacher_id: TeacherId, name: &str) -> Self {
        self.teachers.insert(teacher_id);
        self.courses.insert(course_id, (teacher_id, name.to_string()));
        self
    }

    /// Register a group inside a course.
    pub fn with_group(mut self, group_id: GroupId, course_id: CourseId, name: &str) -> Self {
        self.groups.insert(group_id, (course_id, name.to_string()));
        self
    }

    /// Put a student into a group.
    pub fn with_member(mut self, group_id: GroupId, student_id: StudentId) -> Self {
        self.members.insert((group_id, student_id));
        self
    }

    fn group_rows(&self, course_id: CourseId, course_name: &str) -> Vec<RosterEntry> {
        let mut rows = Vec::new();
        for (group_id, (_, group_name)) in self.groups.iter().filter(|(_, (c, _))| *c == course_id)
        {
            let mut members: Vec<(StudentId, &StudentProfile)> = self
                .members
                .iter()
                .filter(|(g, _)| g == group_id)
                .filter_map(|(_, s)| self.students.get(s).map(|p| (*s, p)))
                .collect();
            members.sort_by(|(a_id, a), (b_id, b)| {
                (&a.last_name, &a.first_name, a_id).cmp(&(&b.last_name, &b.first_name, b_id))
            });

            let base = RosterEntry {
                course_id,
                course_name: course_name.to_string(),
                group_id: Some(*group_id),
                group_name: Some(group_name.clone()),
                student_id: None,
                user_id: None,
                first_name: None,
                last_name: None,
            };
            if members.is_empty() {
                rows.push(base);
                continue;
            }
            for (student_id, profile) in members {
                rows.push(RosterEntry {
                    student_id: Some(student_id),
                    user_id: Some(profile.user_id),
                    first_name: Some(profile.first_name.clone()),
                    last_name: Some(profile.last_name.clone()),
                    ..base.clone()
                });
            }
        }
        rows
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn teacher_exists(&self, teacher_id: TeacherId) -> AppResult<bool> {
        Ok(self.teachers.contains(&teacher_id))
    }

    async fn student_for_user(&self, user_id: UserId) -> AppResult<Option<StudentId>> {
        Ok(self
            .students
            .iter()
            .find(|(_, profile)| profile.user_id == user_id)
            .map(|(id, _)| *id))
    }

    async fn roster_for_teacher(&self, teacher_id: TeacherId) -> AppResult<Vec<RosterEntry>> {
        let mut rows = Vec::new();
        for (course_id, (_, course_name)) in
            self.courses.iter().filter(|(_, (t, _))| *t == teacher_id)
        {
            let groups = self.group_rows(*course_id, course_name);
            if groups.is_empty() {
                rows.push(RosterEntry {
                    course_id: *course_id,
                    course_name: course_name.clone(),
                    group_id: None,
                    group_name: None,
                    student_id: None,
                    user_id: None,
                    first_name: None,
                    last_name: None,
                });
            } else {
                rows.extend(groups);
            }
        }
        Ok(rows)
    }
}
