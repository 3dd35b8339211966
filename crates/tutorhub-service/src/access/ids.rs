//! Parsing of student-id payloads.

use std::collections::BTreeSet;

use serde_json::Value;

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::StudentId;

/// Parse a JSON payload into a deduplicated set of student ids.
///
/// The payload must be an array. Items may be positive integers or strings
/// holding positive integers; anything else is rejected with the offending
/// item in the message.
pub fn parse_student_ids(payload: &Value) -> AppResult<BTreeSet<StudentId>> {
    let items = payload
        .as_array()
        .ok_or_else(|| AppError::validation("Expected an array of student ids"))?;

    items
        .iter()
        .map(|item| {
            let parsed = match item {
                Value::Number(n) => n.as_i64().and_then(StudentId::positive),
                Value::String(s) => s.parse::<StudentId>().ok(),
                _ => None,
            };
            parsed.ok_or_else(|| AppError::validation(format!("Invalid student id: {item}")))
        })
        .collect()
}
