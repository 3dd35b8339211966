//! # tutorhub-core
//!
//! Core crate for TutorHub. Contains configuration schemas, typed
//! identifiers, listing order and filter types, the blob storage trait,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other TutorHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
