//! # tutorhub-service
//!
//! Business logic for the materials library. Services receive their
//! stores through constructor injection and never touch SQL directly.

pub mod access;
pub mod context;
pub mod material;

pub use access::{AccessChange, AccessDiff, AccessPropagationEngine, parse_student_ids};
pub use context::{RequestContext, UserRole};
pub use material::{
    CreateMaterialRequest, ListingQuery, MaterialListingService, MaterialNode, MaterialService,
    TreeNavigator, UploadedFile,
};
