//! Shared key generation for storage backends.
//!
//! Key format: `{project_id}/{millis}-{sanitized_filename}`. The timestamp
//! keeps keys unique across sessions for the same project; the sanitized
//! filename keeps them readable.

use chrono::Utc;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

const MAX_FILENAME_LENGTH: usize = 255;

/// Generate a project-scoped storage key for the given filename.
///
/// All backends must use this format for consistency.
pub fn namespaced_key(project_id: Uuid, filename: &str) -> StorageResult<String> {
    let name = sanitize_filename(filename)?;
    Ok(format!(
        "{}/{}-{}",
        project_id,
        Utc::now().timestamp_millis(),
        name
    ))
}

/// Sanitize a filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> StorageResult<String> {
    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(StorageError::InvalidKey(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}
