//! Core types for the dataroom upload pipeline.
//!
//! This crate holds everything the pipeline shares: configuration, error
//! types, the session/file data model, the document taxonomy, the filename
//! classifier, and pre-upload validation. It performs no I/O.

pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod taxonomy;
pub mod validation;

// Re-export commonly used types
pub use classifier::{Classifier, KeywordClassifier};
pub use config::PipelineConfig;
pub use error::AppError;
pub use storage_types::BackendKind;
pub use taxonomy::{CategorySelection, Classification, Domain};
