//! Request context carrying the caller identity resolved by the upstream gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorhub_core::error::AppError;
use tutorhub_core::types::{TeacherId, UserId};

/// Platform role of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Teacher owning material trees.
    Teacher,
    /// Student consuming materials.
    Student,
}

impl std::str::FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            other => Err(AppError::authentication(format!("Unknown role '{other}'"))),
        }
    }
}

/// Context for the current authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The caller's user account.
    pub user_id: UserId,
    /// The caller's role.
    pub role: UserRole,
    /// Teacher profile of the caller, when the caller is a teacher.
    pub teacher_id: Option<TeacherId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole, teacher_id: Option<TeacherId>) -> Self {
        Self {
            user_id,
            role,
            teacher_id,
            request_time: Utc::now(),
        }
    }

    /// Context for a teacher acting on their own materials.
    pub fn teacher(user_id: UserId, teacher_id: TeacherId) -> Self {
        Self::new(user_id, UserRole::Teacher, Some(teacher_id))
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Returns whether the caller may manage materials owned by `owner`.
    pub fn manages(&self, owner: TeacherId) -> bool {
        self.is_admin() || (self.role == UserRole::Teacher && self.teacher_id == Some(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("Teacher".parse::<UserRole>().unwrap(), UserRole::Teacher);
        assert!("guest".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_manages() {
        let teacher = RequestContext::teacher(UserId::new(1), TeacherId::new(5));
        assert!(teacher.manages(TeacherId::new(5)));
        assert!(!teacher.manages(TeacherId::new(6)));

        let admin = RequestContext::new(UserId::new(2), UserRole::Admin, None);
        assert!(admin.manages(TeacherId::new(6)));

        let student = RequestContext::new(UserId::new(3), UserRole::Student, Some(TeacherId::new(5)));
        assert!(!student.manages(TeacherId::new(5)));
    }
}
