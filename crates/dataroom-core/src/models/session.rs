use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::upload_file::{FileStatus, UploadFile};
use crate::taxonomy::CategorySelection;

/// How files of a batch get their category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// The caller supplies one category applied to every file.
    Manual,
    /// Each file is classified independently from its filename.
    Ai,
}

impl FromStr for UploadMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(UploadMode::Manual),
            "ai" => Ok(UploadMode::Ai),
            _ => Err(anyhow::anyhow!("Invalid upload mode: {}", s)),
        }
    }
}

/// One batch-upload invocation's aggregate record.
///
/// A session is created by the orchestrator from an upload request, mutated
/// only by that one run, and handed back to the caller once every file has
/// reached a terminal status. It is never persisted: a crash mid-run loses
/// all state and the caller re-submits from scratch.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub id: Uuid,
    pub project_id: Uuid,
    pub mode: UploadMode,
    /// Category applied to every file in manual mode.
    pub manual_category: Option<CategorySelection>,
    pub files: Vec<UploadFile>,
    pub total_files: usize,
    pub completed_files: usize,
    pub failed_files: usize,
    pub total_bytes: u64,
    pub uploaded_bytes: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UploadSession {
    pub fn new(
        project_id: Uuid,
        mode: UploadMode,
        manual_category: Option<CategorySelection>,
        files: Vec<UploadFile>,
    ) -> Self {
        let total_files = files.len();
        let total_bytes = files.iter().map(|f| f.size_bytes).sum();
        UploadSession {
            id: Uuid::new_v4(),
            project_id,
            mode,
            manual_category,
            files,
            total_files,
            completed_files: 0,
            failed_files: 0,
            total_bytes,
            uploaded_bytes: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Overall transfer progress in percent, from bytes actually uploaded.
    /// An empty batch reports 0.
    pub fn overall_progress(&self) -> u8 {
        if self.total_bytes == 0 {
            return 0;
        }
        ((self.uploaded_bytes as f64 / self.total_bytes as f64) * 100.0).round() as u8
    }

    /// Whether every file has reached a terminal status.
    pub fn is_settled(&self) -> bool {
        self.files.iter().all(|f| f.is_terminal())
    }

    /// Transition the file at `index` to `Completed` and update counters.
    /// Already-terminal files are left untouched.
    pub fn complete_file(&mut self, index: usize) {
        let file = &mut self.files[index];
        if file.is_terminal() {
            return;
        }
        file.status = FileStatus::Completed;
        file.progress = 100;
        self.completed_files += 1;
    }

    /// Transition the file at `index` to `Failed` with a reason and update
    /// counters. Already-terminal files are left untouched.
    pub fn fail_file(&mut self, index: usize, reason: impl Into<String>) {
        let file = &mut self.files[index];
        if file.is_terminal() {
            return;
        }
        file.status = FileStatus::Failed;
        file.error = Some(reason.into());
        self.failed_files += 1;
    }

    /// Stamp the completion timestamp once all files are terminal.
    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn session_with(files: Vec<UploadFile>) -> UploadSession {
        UploadSession::new(Uuid::new_v4(), UploadMode::Ai, None, files)
    }

    fn file(name: &str, bytes: &'static [u8]) -> UploadFile {
        UploadFile::new(name, "application/pdf", Bytes::from_static(bytes))
    }

    #[test]
    fn new_session_aggregates_totals() {
        let session = session_with(vec![file("a.pdf", b"12345"), file("b.pdf", b"123")]);
        assert_eq!(session.total_files, 2);
        assert_eq!(session.total_bytes, 8);
        assert_eq!(session.uploaded_bytes, 0);
        assert!(session.completed_at.is_none());
    }

    #[test]
    fn counters_track_terminal_transitions() {
        let mut session = session_with(vec![file("a.pdf", b"1"), file("b.pdf", b"2")]);
        session.complete_file(0);
        session.fail_file(1, "storage unavailable");
        assert_eq!(session.completed_files, 1);
        assert_eq!(session.failed_files, 1);
        assert_eq!(
            session.completed_files + session.failed_files,
            session.total_files
        );
        assert!(session.is_settled());
        assert_eq!(session.files[1].error.as_deref(), Some("storage unavailable"));
    }

    #[test]
    fn terminal_files_are_not_double_counted() {
        let mut session = session_with(vec![file("a.pdf", b"1")]);
        session.fail_file(0, "first");
        session.complete_file(0);
        session.fail_file(0, "second");
        assert_eq!(session.failed_files, 1);
        assert_eq!(session.completed_files, 0);
        assert_eq!(session.files[0].error.as_deref(), Some("first"));
    }

    #[test]
    fn overall_progress_of_empty_batch_is_zero() {
        let session = session_with(vec![]);
        assert_eq!(session.overall_progress(), 0);
    }

    #[test]
    fn overall_progress_rounds_byte_ratio() {
        let mut session = session_with(vec![file("a.pdf", b"12"), file("b.pdf", b"1")]);
        session.uploaded_bytes = 2;
        assert_eq!(session.overall_progress(), 67);
        session.uploaded_bytes = 3;
        assert_eq!(session.overall_progress(), 100);
    }
}
