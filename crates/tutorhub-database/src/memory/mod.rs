//! In-memory store implementations.
//!
//! Used by tests and by deployments that run without PostgreSQL. All
//! state sits behind one async mutex, so an access-change transaction
//! holds exclusive access from `begin` until commit or drop.

pub mod directory;
pub mod store;

pub use directory::MemoryDirectory;
pub use store::MemoryStore;
