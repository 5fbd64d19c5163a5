//! Dataroom Pipeline Library
//!
//! The batch upload and classification pipeline: a `SessionOrchestrator`
//! drives each file of a request through validation, storage, and
//! classification/confirmation, maintaining the per-session state machine
//! and notifying the caller through `UploadCallbacks`.
//!
//! Partial failure is the normal case: a file's failure never aborts the
//! batch, and the caller always gets back a settled `UploadSession` with a
//! mix of completed and failed entries.

pub mod confirmation;
pub mod orchestrator;
pub mod progress;

// Re-export commonly used types
pub use confirmation::{
    ConfirmationFailure, ConfirmationOutcome, ConfirmationRequest, ConfirmationService,
    ConfirmedDocument, Confirmer, StoredFileRef,
};
pub use orchestrator::{NewUploadFile, SessionOrchestrator, UploadRequest};
pub use progress::{ProgressUpdate, UploadCallbacks};
