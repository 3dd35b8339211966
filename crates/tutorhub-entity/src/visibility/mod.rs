//! Visibility grants and the access report built from them.

pub mod grant;
pub mod report;

pub use grant::VisibilityGrant;
pub use report::{AccessReport, CourseAccess, GroupAccess, StudentAccess};
