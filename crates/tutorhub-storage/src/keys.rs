//! Blob key construction.

use tutorhub_core::types::TeacherId;
use uuid::Uuid;

/// Build a unique blob key for a file uploaded by `teacher_id`.
///
/// The original file name is kept as a suffix with path separators and
/// control characters replaced, so keys never escape their directory.
pub fn upload_key(teacher_id: TeacherId, file_name: &str) -> String {
    let safe: String = file_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe = safe.trim_start_matches('.');
    let safe = if safe.is_empty() { "upload" } else { safe };
    format!("materials/{teacher_id}/{}-{safe}", Uuid::new_v4())
}
