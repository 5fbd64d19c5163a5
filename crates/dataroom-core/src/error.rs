//! Error types module
//!
//! File-level failures (validation, storage, confirmation) are captured into
//! the file records of a session and surfaced through callbacks; they never
//! escape the pipeline's top-level call. `AppError` covers the remaining
//! cases: requests that cannot start a session at all, and batch-level
//! confirmation transport failures crossing the `Confirmer` boundary.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Confirmation failed: {0}")]
    Confirmation(String),
}
