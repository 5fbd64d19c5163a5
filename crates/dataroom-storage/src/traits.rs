//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. The orchestrator receives a backend as an injected
//! `Arc<dyn Storage>`, never through global configuration.

use async_trait::async_trait;
use bytes::Bytes;
use dataroom_core::BackendKind;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Coordinates of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Internal identifier used to reference the object.
    pub key: String,
    /// Publicly retrievable URL.
    pub url: String,
}

/// Storage abstraction trait
///
/// Backends are treated as unreliable collaborators: any transport or
/// service error surfaces as a `StorageError` for the caller to catch per
/// file; a failing store call must never take down a whole batch.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store a file under a project-scoped key and return its coordinates.
    ///
    /// `on_progress` receives transfer percentages in `[0, 100]`; backends
    /// that cannot observe intermediate progress may call it only on
    /// completion, but reported values must never decrease.
    async fn store(
        &self,
        project_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Bytes,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> StorageResult<StoredObject>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete an object by its storage key
    ///
    /// Used by the orphan-cleanup hook after a failed confirmation phase.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend kind
    fn backend_kind(&self) -> BackendKind;
}
