//! Material tree services.

pub mod listing;
pub mod service;
pub mod tree;

pub use listing::{ListingQuery, MaterialListingService};
pub use service::{CreateMaterialRequest, MaterialService, UploadedFile};
pub use tree::{MaterialNode, TreeNavigator};
