//! Typed path parameter helpers.

use std::str::FromStr;

use tutorhub_core::error::AppError;
use tutorhub_core::types::InvalidId;

/// Parses a positive id from a path segment.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<T, AppError>
where
    T: FromStr<Err = InvalidId>,
{
    raw.parse()
        .map_err(|e: InvalidId| AppError::validation(format!("Invalid {what} id: {e}")))
}
