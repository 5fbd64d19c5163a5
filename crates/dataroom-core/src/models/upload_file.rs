use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::taxonomy::Classification;

/// Lifecycle state of one file within a session.
///
/// `Completed` and `Failed` are terminal; no transition leaves them within a
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl FileStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Failed)
    }
}

/// One file's lifecycle record within an upload session.
///
/// The id is generated and independent of the filename, since a batch may
/// contain the same filename twice.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub data: Bytes,
    pub status: FileStatus,
    /// Transfer progress in percent, non-decreasing while uploading.
    pub progress: u8,
    /// Number of storage re-attempts performed for this file.
    pub retry_count: u32,
    pub error: Option<String>,
    // Set once stored
    pub storage_key: Option<String>,
    pub storage_url: Option<String>,
    // Set once classified/confirmed
    pub document_id: Option<String>,
    pub classification: Option<Classification>,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        let size_bytes = data.len() as u64;
        UploadFile {
            id: Uuid::new_v4(),
            filename: filename.into(),
            content_type: content_type.into(),
            size_bytes,
            data,
            status: FileStatus::Pending,
            progress: 0,
            retry_count: 0,
            error: None,
            storage_key: None,
            storage_url: None,
            document_id: None,
            classification: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record the stored object's coordinates. Storage counts as full
    /// transfer progress for the file.
    pub fn mark_stored(&mut self, key: impl Into<String>, url: impl Into<String>) {
        self.storage_key = Some(key.into());
        self.storage_url = Some(url.into());
        self.progress = 100;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_starts_pending() {
        let file = UploadFile::new("report.pdf", "application/pdf", Bytes::from_static(b"abc"));
        assert_eq!(file.status, FileStatus::Pending);
        assert_eq!(file.size_bytes, 3);
        assert_eq!(file.progress, 0);
        assert_eq!(file.retry_count, 0);
        assert!(file.error.is_none());
    }

    #[test]
    fn ids_are_unique_for_duplicate_filenames() {
        let a = UploadFile::new("report.pdf", "application/pdf", Bytes::new());
        let b = UploadFile::new("report.pdf", "application/pdf", Bytes::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn terminal_statuses() {
        assert!(FileStatus::Completed.is_terminal());
        assert!(FileStatus::Failed.is_terminal());
        assert!(!FileStatus::Pending.is_terminal());
        assert!(!FileStatus::Uploading.is_terminal());
        assert!(!FileStatus::Processing.is_terminal());
    }
}
