//! Session orchestration.
//!
//! The orchestrator owns the `UploadSession` aggregate for exactly one run:
//! it validates every file up front, drives the survivors through storage
//! one at a time in submission order, classifies them inline (simulated
//! backend) or through a single batched confirmation call (remote backend),
//! and keeps the per-file state machine and session counters consistent
//! throughout.
//!
//! Per-file state machine: `Pending → Uploading → (Processing, AI mode) →
//! Completed`, with any non-terminal state able to drop to `Failed`.
//! `Completed` and `Failed` are terminal.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use dataroom_core::models::{FileStatus, UploadFile, UploadMode, UploadSession};
use dataroom_core::taxonomy::{CategorySelection, Classification};
use dataroom_core::validation::validate_file;
use dataroom_core::{AppError, BackendKind, Classifier, PipelineConfig};
use dataroom_storage::{Storage, StorageError, StoredObject};

use crate::confirmation::{ConfirmationRequest, Confirmer, StoredFileRef};
use crate::progress::{
    report_completed, report_failed, report_progress, ProgressUpdate, UploadCallbacks,
};

/// One candidate file of an upload request.
pub struct NewUploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A batch upload request.
///
/// `category`/`category_code` are required in manual mode and ignored in AI
/// mode.
pub struct UploadRequest {
    pub project_id: Uuid,
    pub files: Vec<NewUploadFile>,
    pub mode: UploadMode,
    pub category: Option<String>,
    pub category_code: Option<String>,
}

/// Drives upload sessions against injected collaborators.
///
/// Every dependency is passed in explicitly; swapping the storage backend
/// or the confirmer requires no configuration, only construction.
pub struct SessionOrchestrator {
    storage: Arc<dyn Storage>,
    classifier: Arc<dyn Classifier>,
    confirmer: Arc<dyn Confirmer>,
    config: PipelineConfig,
    cancel: CancellationToken,
}

impl SessionOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        classifier: Arc<dyn Classifier>,
        confirmer: Arc<dyn Confirmer>,
        config: PipelineConfig,
    ) -> Self {
        SessionOrchestrator {
            storage,
            classifier,
            confirmer,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token. Cancellation is observed between file
    /// iterations: remaining files fail with a cancellation reason and the
    /// session still settles normally.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run one upload session to completion.
    ///
    /// Only a request that cannot start a session at all errors here; every
    /// per-file problem is captured in the returned session's file records
    /// and surfaced through the callbacks.
    pub async fn run(
        &self,
        request: UploadRequest,
        callbacks: &UploadCallbacks,
    ) -> Result<UploadSession, AppError> {
        let mut session = self.open_session(request)?;

        tracing::info!(
            session_id = %session.id,
            project_id = %session.project_id,
            mode = ?session.mode,
            total_files = session.total_files,
            total_bytes = session.total_bytes,
            backend = %self.storage.backend_kind(),
            "Upload session started"
        );

        // Phase 1: validate everything before any I/O.
        for index in 0..session.files.len() {
            let file = &session.files[index];
            if let Err(e) =
                validate_file(&file.filename, &file.content_type, file.size_bytes, &self.config)
            {
                session.fail_file(index, e.to_string());
                report_failed(callbacks, &session, index);
            }
        }

        // Phase 2: store surviving files one at a time, in submission order.
        let mut stored: Vec<usize> = Vec::new();
        for index in 0..session.files.len() {
            if session.files[index].is_terminal() {
                continue;
            }

            if self.cancel.is_cancelled() {
                session.fail_file(index, "session cancelled");
                report_failed(callbacks, &session, index);
                continue;
            }

            session.files[index].status = FileStatus::Uploading;
            report_progress(callbacks, &session, index);

            match self.store_with_retry(&mut session, index, callbacks).await {
                Ok(object) => {
                    session.files[index].mark_stored(object.key, object.url);
                    session.uploaded_bytes += session.files[index].size_bytes;
                    report_progress(callbacks, &session, index);

                    match self.storage.backend_kind() {
                        BackendKind::Simulated => {
                            self.finalize_inline(&mut session, index, callbacks)
                        }
                        BackendKind::Remote => stored.push(index),
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id,
                        filename = %session.files[index].filename,
                        error = %e,
                        "File upload failed"
                    );
                    session.fail_file(index, e.to_string());
                    report_failed(callbacks, &session, index);
                }
            }
        }

        // Phase 3 (remote only): one confirmation call for all stored files.
        if !stored.is_empty() {
            self.confirm_stored(&mut session, &stored, callbacks).await;
        }

        session.finish();

        tracing::info!(
            session_id = %session.id,
            completed = session.completed_files,
            failed = session.failed_files,
            uploaded_bytes = session.uploaded_bytes,
            duration_ms = (chrono::Utc::now() - session.started_at).num_milliseconds(),
            "Upload session finished"
        );

        Ok(session)
    }

    /// Build the session aggregate, rejecting requests that cannot start.
    fn open_session(&self, request: UploadRequest) -> Result<UploadSession, AppError> {
        if request.files.is_empty() {
            return Err(AppError::InvalidRequest("no files provided".to_string()));
        }

        let manual_category = match request.mode {
            UploadMode::Manual => {
                let category = request.category.ok_or_else(|| {
                    AppError::InvalidRequest("manual mode requires a category".to_string())
                })?;
                let code = request.category_code.ok_or_else(|| {
                    AppError::InvalidRequest("manual mode requires a category code".to_string())
                })?;
                Some(CategorySelection { category, code })
            }
            UploadMode::Ai => None,
        };

        let files: Vec<UploadFile> = request
            .files
            .into_iter()
            .map(|f| UploadFile::new(f.filename, f.content_type, f.data))
            .collect();

        Ok(UploadSession::new(
            request.project_id,
            request.mode,
            manual_category,
            files,
        ))
    }

    /// Store one file, re-attempting on storage errors per the configured
    /// retry policy. Validation never reaches here; confirmation failures
    /// are not retried.
    async fn store_with_retry(
        &self,
        session: &mut UploadSession,
        index: usize,
        callbacks: &UploadCallbacks,
    ) -> Result<StoredObject, StorageError> {
        let session_id = session.id;
        let project_id = session.project_id;
        let total_files = session.total_files;
        let overall_progress = session.overall_progress();
        let snapshot = session.files[index].clone();

        // Reported progress never regresses across retry attempts.
        let high_water = AtomicU8::new(snapshot.progress);
        let on_progress = |p: u8| {
            let previous = high_water.fetch_max(p, Ordering::SeqCst);
            if let Some(cb) = &callbacks.on_progress {
                let mut file = snapshot.clone();
                file.status = FileStatus::Uploading;
                file.progress = p.max(previous);
                cb(&ProgressUpdate {
                    session_id,
                    file,
                    overall_progress,
                    current_file_index: index + 1,
                    total_files,
                });
            }
        };

        let mut attempt: u32 = 0;
        loop {
            let result = self
                .storage
                .store(
                    project_id,
                    &snapshot.filename,
                    &snapshot.content_type,
                    snapshot.data.clone(),
                    &on_progress,
                )
                .await;

            match result {
                Ok(object) => return Ok(object),
                Err(e) if attempt < self.config.retry_attempts => {
                    attempt += 1;
                    session.files[index].retry_count = attempt;
                    tracing::warn!(
                        session_id = %session_id,
                        filename = %snapshot.filename,
                        attempt = attempt,
                        error = %e,
                        "Retrying upload after storage error"
                    );
                    if self.config.retry_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms))
                            .await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Simulated path: classify and complete a stored file before the next
    /// file starts.
    fn finalize_inline(
        &self,
        session: &mut UploadSession,
        index: usize,
        callbacks: &UploadCallbacks,
    ) {
        match session.mode {
            UploadMode::Ai => {
                session.files[index].status = FileStatus::Processing;
                report_progress(callbacks, session, index);
                let classification = self.classifier.classify(&session.files[index].filename);
                session.files[index].classification = Some(classification);
            }
            UploadMode::Manual => {
                if let Some(selection) = &session.manual_category {
                    session.files[index].classification = Some(selection.to_classification());
                }
            }
        }
        session.complete_file(index);
        report_completed(callbacks, session, index);
    }

    /// Remote path: one confirmation call for every stored file, merged back
    /// into file state in submission order.
    async fn confirm_stored(
        &self,
        session: &mut UploadSession,
        stored: &[usize],
        callbacks: &UploadCallbacks,
    ) {
        if session.mode == UploadMode::Ai {
            for &index in stored {
                session.files[index].status = FileStatus::Processing;
                report_progress(callbacks, session, index);
            }
        }

        let request = ConfirmationRequest {
            project_id: session.project_id,
            files: stored
                .iter()
                .map(|&index| {
                    let file = &session.files[index];
                    StoredFileRef {
                        key: file.storage_key.clone().unwrap_or_default(),
                        file_name: file.filename.clone(),
                        file_size: file.size_bytes,
                        content_type: file.content_type.clone(),
                    }
                })
                .collect(),
            mode: session.mode,
            category: session.manual_category.as_ref().map(|c| c.category.clone()),
            category_code: session.manual_category.as_ref().map(|c| c.code.clone()),
        };

        match self.confirmer.confirm(&request).await {
            Ok(outcome) => {
                for &index in stored {
                    let key = session.files[index].storage_key.clone().unwrap_or_default();
                    if let Some(doc) = outcome.documents.iter().find(|d| d.key == key) {
                        session.files[index].document_id = Some(doc.document_id.clone());
                        session.files[index].classification = Some(Classification {
                            category: doc.category.clone(),
                            code: doc.category_code.clone(),
                            domain: doc.domain,
                        });
                        session.complete_file(index);
                        report_completed(callbacks, session, index);
                    } else if let Some(failure) = outcome.errors.iter().find(|e| e.key == key) {
                        session.fail_file(index, failure.error.clone());
                        report_failed(callbacks, session, index);
                    } else {
                        session.fail_file(index, "file was not confirmed".to_string());
                        report_failed(callbacks, session, index);
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session.id,
                    error = %e,
                    "Confirmation phase failed; degrading stored files"
                );
                let orphaned: Vec<String> = stored
                    .iter()
                    .filter_map(|&index| session.files[index].storage_key.clone())
                    .collect();
                for &index in stored {
                    session.fail_file(index, format!("classification failed: {}", e));
                    report_failed(callbacks, session, index);
                }
                self.handle_orphans(&orphaned).await;
            }
        }
    }

    /// Storage already happened and is not rolled back when confirmation
    /// fails; the stored objects are orphans. They are always logged, and
    /// `cleanup_orphans` additionally attempts a best-effort delete.
    async fn handle_orphans(&self, keys: &[String]) {
        tracing::warn!(
            orphaned = keys.len(),
            keys = ?keys,
            "Stored objects left unconfirmed"
        );

        if !self.config.cleanup_orphans {
            return;
        }

        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(key = %key, error = %e, "Orphan cleanup delete failed");
            }
        }
    }
}
