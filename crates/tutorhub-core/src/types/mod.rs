//! Core type definitions used across the TutorHub workspace.

pub mod filter;
pub mod id;
pub mod sorting;

pub use filter::ExtensionFilter;
pub use id::*;
pub use sorting::MaterialOrder;
