//! HTTP request handlers.

pub mod access;
pub mod health;
pub mod material;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use tutorhub_core::error::AppError;

/// Parses a JSON body, reporting malformed input as a validation error.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))
}
