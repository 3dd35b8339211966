//! Custom Axum extractors.

pub mod auth;
pub mod create;
pub mod listing;
pub mod path;

pub use auth::AuthUser;
pub use create::CreateMaterialForm;
pub use listing::ListingParams;
