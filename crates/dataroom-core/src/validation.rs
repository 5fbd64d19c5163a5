//! Pre-upload file validation.
//!
//! Validation is pure and runs for every file of a batch before any upload
//! begins, so callers get the full picture of rejected files up front.

use thiserror::Error;

use crate::config::PipelineConfig;

/// Why a file was rejected before any I/O was attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file size {size_bytes} exceeds maximum allowed size of {max_bytes} bytes")]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("file type not allowed (content type '{content_type}', extension '{extension}')")]
    TypeNotAllowed {
        content_type: String,
        extension: String,
    },
}

/// Validate a candidate file against the configured limits.
///
/// The type check accepts a file when *either* the declared content type
/// *or* the filename extension is allow-listed. The checks are deliberately
/// OR'd: browsers report unreliable MIME types for office formats, and the
/// permissive contract is load-bearing for existing clients.
pub fn validate_file(
    filename: &str,
    content_type: &str,
    size_bytes: u64,
    config: &PipelineConfig,
) -> Result<(), ValidationError> {
    if size_bytes > config.max_file_size_bytes {
        return Err(ValidationError::FileTooLarge {
            size_bytes,
            max_bytes: config.max_file_size_bytes,
        });
    }

    let normalized = normalize_mime_type(content_type).to_lowercase();
    let extension = file_extension(filename);

    let mime_allowed = config
        .allowed_content_types
        .iter()
        .any(|ct| normalized == ct.to_lowercase());
    let extension_allowed = config.allowed_extensions.contains(&extension);

    if !mime_allowed && !extension_allowed {
        return Err(ValidationError::TypeNotAllowed {
            content_type: normalized,
            extension,
        });
    }

    Ok(())
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "application/pdf; charset=utf-8" -> "application/pdf").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Lower-cased filename extension, empty when the name has none.
fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}
