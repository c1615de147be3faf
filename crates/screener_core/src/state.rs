use std::fmt;

use crate::draft::{DraftBatch, ExistingJobMatch, FileMeta, SelectedFile};
use crate::stability::{ProcessingSnapshot, StabilityTracker, SyncPolicy};
use crate::view_model::AppViewModel;

/// Opaque, server-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One resume as reported by a job fetch. `analyzed` mirrors whether the
/// server-side analysis exists; `bucket` is the one derived field the user
/// may override locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeRow {
    pub id: String,
    pub filename: String,
    pub candidate_name: Option<String>,
    pub analyzed: bool,
    pub bucket: Option<String>,
}

/// Accepted-submission receipt from the backend. From here on the heavy
/// work happens asynchronously server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    pub total_resumes: u32,
    pub is_existing_job: bool,
    pub duplicate_count: u32,
    pub skipped_files: Vec<SkippedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Why a submission failed. There is no automatic retry; the user resubmits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// Non-2xx response, surfaced with the status code.
    Status(u16),
    Transport(String),
}

/// Why a probe (description check or duplicate check) failed. Probes fail
/// open: the caller proceeds as if nothing was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Status(u16),
    Transport(String),
}

/// Result of a duplicate probe, scoped to one target job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DuplicateReport {
    pub total_files: u32,
    pub unique_count: u32,
    pub duplicate_count: u32,
    pub duplicates: Vec<DuplicateEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    pub filename: String,
    /// Per-file probe error, e.g. an unreadable upload.
    pub error: Option<String>,
    pub duplicate_of: Option<DuplicateOrigin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateOrigin {
    pub resume_filename: String,
    pub job_id: JobId,
    pub candidate_name: Option<String>,
}

/// Severity tag of a push-channel progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Info,
    Success,
    Warning,
    Error,
    Processing,
    Complete,
}

/// One push-channel event. `timestamp` is epoch seconds as sent by the
/// backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressNote {
    pub kind: NoteKind,
    pub message: String,
    pub timestamp: f64,
}

/// Severity of the single user-facing banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// The one dismissible message slot. The token lets a delayed auto-clear
/// recognize that a newer banner has replaced the one it was armed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub severity: Severity,
    pub text: String,
    pub token: u64,
}

/// Lifecycle of the synchronizer for one job. `Settled` is terminal; a new
/// job id starts a fresh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Polling,
    Settled,
}

/// Push notes kept for the progress log. Older notes are dropped.
const NOTE_LOG_LIMIT: usize = 100;

/// Per-job synchronizer state: the poll/push reconciliation target.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyncState {
    pub(crate) job_id: JobId,
    pub(crate) phase: SyncPhase,
    pub(crate) rows: Vec<ResumeRow>,
    pub(crate) snapshot: Option<ProcessingSnapshot>,
    pub(crate) tracker: StabilityTracker,
    pub(crate) notes: Vec<ProgressNote>,
    pub(crate) not_found: bool,
}

impl SyncState {
    pub(crate) fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            phase: SyncPhase::Polling,
            rows: Vec::new(),
            snapshot: None,
            tracker: StabilityTracker::default(),
            notes: Vec::new(),
            not_found: false,
        }
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.phase == SyncPhase::Settled
    }

    /// Apply one poll result and return the updated stable-run length.
    pub(crate) fn apply_rows(&mut self, rows: Vec<ResumeRow>) -> u32 {
        let snapshot = ProcessingSnapshot {
            total: rows.len() as u32,
            analyzed: rows.iter().filter(|row| row.analyzed).count() as u32,
        };
        self.rows = rows;
        self.snapshot = Some(snapshot);
        self.tracker.observe(snapshot.total)
    }

    pub(crate) fn push_note(&mut self, note: ProgressNote) {
        self.notes.push(note);
        if self.notes.len() > NOTE_LOG_LIMIT {
            let excess = self.notes.len() - NOTE_LOG_LIMIT;
            self.notes.drain(..excess);
        }
    }

    pub(crate) fn settle(&mut self) {
        self.phase = SyncPhase::Settled;
    }
}

/// The current unsubmitted batch plus its bookkeeping flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct DraftState {
    pub(crate) jd_files: Vec<SelectedFile>,
    pub(crate) resumes: Vec<SelectedFile>,
    pub(crate) existing_job: Option<ExistingJobMatch>,
    /// Set when the draft came back from persistence: metadata is shown but
    /// submission is blocked until fresh handles are attached.
    pub(crate) awaiting_files: bool,
}

impl DraftState {
    pub(crate) fn snapshot(&self) -> DraftBatch {
        DraftBatch {
            jd_files: self.jd_files.iter().map(|f| f.meta.clone()).collect(),
            resumes: self.resumes.iter().map(|f| f.meta.clone()).collect(),
            existing_job: self.existing_job.clone(),
        }
    }

    pub(crate) fn restore(&mut self, batch: DraftBatch) {
        self.jd_files = batch.jd_files.into_iter().map(SelectedFile::restored).collect();
        self.resumes = batch.resumes.into_iter().map(SelectedFile::restored).collect();
        self.existing_job = batch.existing_job;
        self.awaiting_files = !self.jd_files.is_empty() || !self.resumes.is_empty();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jd_files.is_empty() && self.resumes.is_empty() && self.existing_job.is_none()
    }

    pub(crate) fn jd_metas(&self) -> Vec<FileMeta> {
        self.jd_files.iter().map(|f| f.meta.clone()).collect()
    }

    pub(crate) fn resume_metas(&self) -> Vec<FileMeta> {
        self.resumes.iter().map(|f| f.meta.clone()).collect()
    }
}

/// Whole-application state. Mutated only by [`crate::update`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) policy: SyncPolicy,
    pub(crate) draft: DraftState,
    pub(crate) banner: Option<Banner>,
    pub(crate) banner_seq: u64,
    pub(crate) submitting: bool,
    pub(crate) jd_probe_pending: bool,
    pub(crate) duplicate_probe_pending: bool,
    pub(crate) duplicate_report: Option<DuplicateReport>,
    pub(crate) last_receipt: Option<SubmitReceipt>,
    pub(crate) sync: Option<SyncState>,
    pub(crate) dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with a non-default settle policy. The stability threshold is
    /// deployment-dependent, so callers always pass it in.
    pub fn with_policy(policy: SyncPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::project(self)
    }

    /// Returns and clears the dirty flag; the shell re-renders when true.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Replace the banner; returns the token a delayed clear must present.
    pub(crate) fn set_banner(&mut self, severity: Severity, text: impl Into<String>) -> u64 {
        self.banner_seq += 1;
        let token = self.banner_seq;
        self.banner = Some(Banner {
            severity,
            text: text.into(),
            token,
        });
        self.mark_dirty();
        token
    }

    /// Clear the banner only if `token` still identifies it.
    pub(crate) fn expire_banner(&mut self, token: u64) {
        if self.banner.as_ref().is_some_and(|b| b.token == token) {
            self.banner = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn active_sync_mut(&mut self, job_id: &JobId) -> Option<&mut SyncState> {
        self.sync
            .as_mut()
            .filter(|sync| sync.job_id == *job_id)
    }
}
