//! Confirmation phase: turn successfully stored files into confirmed
//! documents with assigned ids.
//!
//! Confirmation is the trust boundary for classification and document-id
//! assignment; the upload side never assigns its own document ids. The
//! default implementation runs in-process against the injected storage and
//! classifier; remote deployments substitute their own `Confirmer` behind
//! the same serializable request/response shapes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dataroom_core::models::UploadMode;
use dataroom_core::taxonomy::{CategorySelection, Domain};
use dataroom_core::{AppError, Classifier};
use dataroom_storage::Storage;

/// Reference to one successfully stored file submitted for confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFileRef {
    pub key: String,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
}

/// Batch confirmation request covering every stored file of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub project_id: Uuid,
    pub files: Vec<StoredFileRef>,
    pub mode: UploadMode,
    pub category: Option<String>,
    pub category_code: Option<String>,
}

/// A stored file accepted as a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedDocument {
    pub key: String,
    pub document_id: String,
    pub category: String,
    pub category_code: String,
    pub domain: Domain,
}

/// Per-file confirmation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationFailure {
    pub key: String,
    pub error: String,
}

/// Result of one confirmation call: per-file successes and failures.
/// `success` is true only when no file failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationOutcome {
    pub success: bool,
    pub documents: Vec<ConfirmedDocument>,
    pub errors: Vec<ConfirmationFailure>,
}

/// Confirmation boundary.
///
/// An `Err` means the call failed as a whole (transport-level); per-file
/// problems are reported inside an `Ok` outcome instead.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<ConfirmationOutcome, AppError>;
}

/// In-process confirmation over the injected storage and classifier.
pub struct ConfirmationService {
    storage: Arc<dyn Storage>,
    classifier: Arc<dyn Classifier>,
}

impl ConfirmationService {
    pub fn new(storage: Arc<dyn Storage>, classifier: Arc<dyn Classifier>) -> Self {
        ConfirmationService {
            storage,
            classifier,
        }
    }
}

/// Opaque document id: project id, timestamp, random suffix. Unique within
/// a confirmation call.
fn new_document_id(project_id: Uuid) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!(
        "{}-{}-{}",
        project_id,
        Utc::now().timestamp_millis(),
        suffix.to_lowercase()
    )
}

#[async_trait]
impl Confirmer for ConfirmationService {
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<ConfirmationOutcome, AppError> {
        let manual_selection = match request.mode {
            UploadMode::Manual => {
                let category = request.category.clone().ok_or_else(|| {
                    AppError::InvalidRequest("manual mode requires a category".to_string())
                })?;
                let code = request.category_code.clone().ok_or_else(|| {
                    AppError::InvalidRequest("manual mode requires a category code".to_string())
                })?;
                Some(CategorySelection { category, code })
            }
            UploadMode::Ai => None,
        };

        let mut documents = Vec::new();
        let mut errors = Vec::new();

        for file in &request.files {
            match self.storage.exists(&file.key).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(key = %file.key, "Stored object missing at confirmation");
                    errors.push(ConfirmationFailure {
                        key: file.key.clone(),
                        error: "stored object not found".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    errors.push(ConfirmationFailure {
                        key: file.key.clone(),
                        error: format!("existence check failed: {}", e),
                    });
                    continue;
                }
            }

            let classification = match &manual_selection {
                Some(selection) => selection.to_classification(),
                None => self.classifier.classify(&file.file_name),
            };

            documents.push(ConfirmedDocument {
                key: file.key.clone(),
                document_id: new_document_id(request.project_id),
                category: classification.category,
                category_code: classification.code,
                domain: classification.domain,
            });
        }

        tracing::info!(
            project_id = %request.project_id,
            confirmed = documents.len(),
            failed = errors.len(),
            "Confirmation completed"
        );

        Ok(ConfirmationOutcome {
            success: errors.is_empty(),
            documents,
            errors,
        })
    }
}
