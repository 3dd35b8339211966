//! Read-only rows from the course/group/student directory.

pub mod roster;

pub use roster::RosterEntry;
