//! Progress reporting for upload sessions.
//!
//! Converts internal state deltas into caller notifications. Callbacks are
//! optional; a missing callback is simply not invoked. Callback panics are
//! not caught; callers own their handlers.

use dataroom_core::models::{UploadFile, UploadSession};
use uuid::Uuid;

/// Snapshot handed to the progress callback on every file-state mutation.
#[derive(Debug)]
pub struct ProgressUpdate {
    pub session_id: Uuid,
    /// State of the file just touched, as of this update.
    pub file: UploadFile,
    /// Byte-weighted session progress in percent; 0 for an empty batch.
    pub overall_progress: u8,
    /// 1-based index of the file just touched.
    pub current_file_index: usize,
    pub total_files: usize,
}

type ProgressCallback = Box<dyn Fn(&ProgressUpdate) + Send + Sync>;
type FileCallback = Box<dyn Fn(&UploadFile) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&UploadFile, &str) + Send + Sync>;

/// Caller-supplied notification hooks for one pipeline run.
#[derive(Default)]
pub struct UploadCallbacks {
    /// Fired on every file-state mutation.
    pub on_progress: Option<ProgressCallback>,
    /// Fired when a file reaches `Completed`.
    pub on_file_complete: Option<FileCallback>,
    /// Fired when a file reaches `Failed`, with the triggering message.
    pub on_error: Option<ErrorCallback>,
}

impl UploadCallbacks {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Dispatch a progress notification for the file at `index`.
pub(crate) fn report_progress(
    callbacks: &UploadCallbacks,
    session: &UploadSession,
    index: usize,
) {
    if let Some(cb) = &callbacks.on_progress {
        cb(&ProgressUpdate {
            session_id: session.id,
            file: session.files[index].clone(),
            overall_progress: session.overall_progress(),
            current_file_index: index + 1,
            total_files: session.total_files,
        });
    }
}

/// Progress plus completion notification for a file that just completed.
pub(crate) fn report_completed(
    callbacks: &UploadCallbacks,
    session: &UploadSession,
    index: usize,
) {
    report_progress(callbacks, session, index);
    if let Some(cb) = &callbacks.on_file_complete {
        cb(&session.files[index]);
    }
}

/// Progress plus error notification for a file that just failed.
pub(crate) fn report_failed(callbacks: &UploadCallbacks, session: &UploadSession, index: usize) {
    report_progress(callbacks, session, index);
    if let Some(cb) = &callbacks.on_error {
        let file = &session.files[index];
        let reason = file.error.as_deref().unwrap_or("unknown error");
        cb(file, reason);
    }
}
