//! Dataroom Storage Library
//!
//! This crate provides the storage abstraction for the upload pipeline and
//! its two backends: a remote S3-compatible implementation and a simulated
//! in-memory implementation.
//!
//! # Storage key format
//!
//! Keys are project-scoped: `{project_id}/{millis}-{sanitized_filename}`.
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-remote")]
pub mod remote;
#[cfg(feature = "storage-simulated")]
pub mod simulated;
pub mod traits;

// Re-export commonly used types
pub use dataroom_core::BackendKind;
pub use factory::create_storage;
#[cfg(feature = "storage-remote")]
pub use remote::RemoteStorage;
#[cfg(feature = "storage-simulated")]
pub use simulated::SimulatedStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
