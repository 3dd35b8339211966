//! # tutorhub-storage
//!
//! Blob storage for uploaded material files. Materials persist only the
//! locator a provider hands back; contents are never read by the core.

pub mod keys;
#[cfg(feature = "local")]
pub mod local;

pub use keys::upload_key;
#[cfg(feature = "local")]
pub use local::LocalBlobStore;
