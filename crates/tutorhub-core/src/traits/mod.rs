//! Core traits defined in `tutorhub-core` and implemented by other crates.

pub mod storage;

pub use storage::BlobStore;
