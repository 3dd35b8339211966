//! PostgreSQL implementations of the store traits.

pub mod directory;
pub mod material;
pub mod tree;
pub mod visibility;

pub use directory::DirectoryRepository;
pub use material::MaterialRepository;
pub use visibility::{PgVisibilityTx, VisibilityRepository};

use tutorhub_core::error::{AppError, ErrorKind};

/// SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE for `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Map a sqlx error to an [`AppError`]. Serialization failures, deadlocks,
/// and lock timeouts become retryable `Conflict`s.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let code = e
            .as_database_error()
            .and_then(|d| d.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE) => {
                AppError::with_source(
                    ErrorKind::Conflict,
                    "Concurrent access change detected, retry the request",
                    e,
                )
            }
            _ => AppError::with_source(ErrorKind::Database, message, e),
        }
    }
}
