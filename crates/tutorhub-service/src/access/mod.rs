//! Visibility changes: payload parsing and the propagation engine.

pub mod ids;
pub mod propagation;

pub use ids::parse_student_ids;
pub use propagation::{AccessChange, AccessDiff, AccessPropagationEngine};
