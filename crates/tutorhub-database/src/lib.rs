//! # tutorhub-database
//!
//! Persistence for the materials library: the store traits the service
//! layer is written against, their PostgreSQL implementations, and an
//! in-memory implementation (feature `memory`).

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{Directory, MaterialStore, VisibilityStore, VisibilityTx};
