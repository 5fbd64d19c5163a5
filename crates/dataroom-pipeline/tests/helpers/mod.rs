//! Test doubles and builders for pipeline integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use dataroom_core::models::UploadMode;
use dataroom_core::{AppError, BackendKind, KeywordClassifier, PipelineConfig};
use dataroom_pipeline::{
    ConfirmationOutcome, ConfirmationRequest, ConfirmationService, Confirmer, NewUploadFile,
    SessionOrchestrator, UploadCallbacks, UploadRequest,
};
use dataroom_storage::{SimulatedStorage, Storage, StorageError, StorageResult, StoredObject};

/// Storage double: delegates to a simulated backend, but reports a chosen
/// backend kind, counts store calls, and fails scripted filenames.
pub struct ScriptedStorage {
    inner: SimulatedStorage,
    kind: BackendKind,
    failures: Mutex<HashMap<String, u32>>,
    store_calls: AtomicUsize,
}

impl ScriptedStorage {
    pub fn simulated() -> Self {
        Self::with_kind(BackendKind::Simulated)
    }

    pub fn remote_like() -> Self {
        Self::with_kind(BackendKind::Remote)
    }

    fn with_kind(kind: BackendKind) -> Self {
        ScriptedStorage {
            inner: SimulatedStorage::new(Duration::ZERO),
            kind,
            failures: Mutex::new(HashMap::new()),
            store_calls: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` store calls for `filename` fail.
    pub fn fail_n_times(self, filename: &str, n: u32) -> Self {
        self.failures.lock().unwrap().insert(filename.to_string(), n);
        self
    }

    /// Make every store call for `filename` fail.
    pub fn fail_always(self, filename: &str) -> Self {
        self.fail_n_times(filename, u32::MAX)
    }

    pub fn store_call_count(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn store(
        &self,
        project_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Bytes,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> StorageResult<StoredObject> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(filename) {
                if *remaining > 0 {
                    if *remaining != u32::MAX {
                        *remaining -= 1;
                    }
                    return Err(StorageError::UploadFailed(
                        "injected storage failure".to_string(),
                    ));
                }
            }
        }

        self.inner
            .store(project_id, filename, content_type, data, on_progress)
            .await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    fn backend_kind(&self) -> BackendKind {
        self.kind
    }
}

/// Confirmer wrapper that counts calls before delegating.
pub struct CountingConfirmer {
    inner: ConfirmationService,
    calls: AtomicUsize,
}

impl CountingConfirmer {
    pub fn new(inner: ConfirmationService) -> Self {
        CountingConfirmer {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Confirmer for CountingConfirmer {
    async fn confirm(
        &self,
        request: &ConfirmationRequest,
    ) -> Result<ConfirmationOutcome, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.confirm(request).await
    }
}

/// Confirmer double that always fails transport-wide.
pub struct FailingConfirmer;

#[async_trait]
impl Confirmer for FailingConfirmer {
    async fn confirm(
        &self,
        _request: &ConfirmationRequest,
    ) -> Result<ConfirmationOutcome, AppError> {
        Err(AppError::Confirmation(
            "confirmation endpoint unreachable".to_string(),
        ))
    }
}

/// Everything the callbacks observed, in firing order.
#[derive(Debug, Clone)]
pub enum Event {
    Progress {
        filename: String,
        file_progress: u8,
        overall_progress: u8,
        index: usize,
    },
    Completed {
        filename: String,
    },
    Error {
        filename: String,
        message: String,
    },
}

/// Records callback invocations for later assertions.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callbacks(&self) -> UploadCallbacks {
        let progress_events = self.events.clone();
        let complete_events = self.events.clone();
        let error_events = self.events.clone();
        UploadCallbacks {
            on_progress: Some(Box::new(move |update| {
                progress_events.lock().unwrap().push(Event::Progress {
                    filename: update.file.filename.clone(),
                    file_progress: update.file.progress,
                    overall_progress: update.overall_progress,
                    index: update.current_file_index,
                });
            })),
            on_file_complete: Some(Box::new(move |file| {
                complete_events.lock().unwrap().push(Event::Completed {
                    filename: file.filename.clone(),
                });
            })),
            on_error: Some(Box::new(move |file, message| {
                error_events.lock().unwrap().push(Event::Error {
                    filename: file.filename.clone(),
                    message: message.to_string(),
                });
            })),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Filenames of terminal notifications (completed or error), in order.
    pub fn terminal_order(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Completed { filename } | Event::Error { filename, .. } => Some(filename),
                Event::Progress { .. } => None,
            })
            .collect()
    }

    /// Progress percentages reported for one file, in order.
    pub fn progress_for(&self, name: &str) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress {
                    filename,
                    file_progress,
                    ..
                } if filename == name => Some(file_progress),
                _ => None,
            })
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Error { .. }))
            .count()
    }
}

/// Config with instant retries, suitable for tests.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        retry_delay_ms: 0,
        simulated_step_delay_ms: 0,
        ..PipelineConfig::default()
    }
}

/// Orchestrator wired with the default classifier and the in-process
/// confirmation service over the given storage.
pub fn orchestrator(storage: Arc<dyn Storage>, config: PipelineConfig) -> SessionOrchestrator {
    let classifier = Arc::new(KeywordClassifier::default());
    let confirmer = Arc::new(ConfirmationService::new(storage.clone(), classifier.clone()));
    SessionOrchestrator::new(storage, classifier, confirmer, config)
}

pub fn pdf_file(name: &str, size: usize) -> NewUploadFile {
    NewUploadFile {
        filename: name.to_string(),
        content_type: "application/pdf".to_string(),
        data: Bytes::from(vec![0u8; size]),
    }
}

pub fn ai_request(files: Vec<NewUploadFile>) -> UploadRequest {
    UploadRequest {
        project_id: Uuid::new_v4(),
        files,
        mode: UploadMode::Ai,
        category: None,
        category_code: None,
    }
}

pub fn manual_request(
    files: Vec<NewUploadFile>,
    category: &str,
    code: &str,
) -> UploadRequest {
    UploadRequest {
        project_id: Uuid::new_v4(),
        files,
        mode: UploadMode::Manual,
        category: Some(category.to_string()),
        category_code: Some(code.to_string()),
    }
}
