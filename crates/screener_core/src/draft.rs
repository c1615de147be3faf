use std::path::PathBuf;

use crate::JobId;

/// Metadata kept for a selected file. This is the only part of a selection
/// that survives persistence; raw contents and live paths never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    /// File kind as reported by the picker, e.g. "pdf" or "docx".
    pub kind: String,
    pub modified_ms: i64,
}

/// A file the user picked in the current session.
///
/// `path` is the live handle from a fresh selection. A draft restored from
/// persisted metadata has `path = None`; submission stays blocked until the
/// user re-selects the actual files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub meta: FileMeta,
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    pub fn has_handle(&self) -> bool {
        self.path.is_some()
    }

    /// A selection restored from metadata alone, without a live path.
    pub fn restored(meta: FileMeta) -> Self {
        Self { meta, path: None }
    }
}

/// Reference to a job already known to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRef {
    pub id: JobId,
    pub resume_count: u32,
}

/// The stored description file returned by the description probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJdFile {
    pub filename: String,
    pub file_type: String,
    pub created_at: String,
    pub content: String,
}

/// A resolved match against a previously uploaded job description.
///
/// When present, submission reuses the stored description content instead of
/// re-uploading the file. `job` is absent when the description is known but
/// no job has been created for it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingJobMatch {
    pub job: Option<JobRef>,
    pub jd_file: StoredJdFile,
}

/// The persisted form of an unsubmitted batch: file metadata plus any
/// resolved existing-job match. Exactly one draft exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftBatch {
    pub jd_files: Vec<FileMeta>,
    pub resumes: Vec<FileMeta>,
    pub existing_job: Option<ExistingJobMatch>,
}

impl DraftBatch {
    pub fn is_empty(&self) -> bool {
        self.jd_files.is_empty() && self.resumes.is_empty() && self.existing_job.is_none()
    }
}
