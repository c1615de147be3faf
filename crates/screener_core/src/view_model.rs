use crate::draft::{ExistingJobMatch, FileMeta, SelectedFile};
use crate::state::{
    AppState, DuplicateReport, JobId, ProgressNote, ResumeRow, Severity, SkippedFile, SyncPhase,
};

/// What the upload form shows about the current draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftView {
    pub jd_files: Vec<FileMeta>,
    pub resumes: Vec<FileMeta>,
    pub existing_job: Option<ExistingJobMatch>,
    /// Restored from persistence: the user must re-select the actual files
    /// before submitting.
    pub awaiting_files: bool,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    pub severity: Severity,
    pub text: String,
}

/// What the job detail view shows about the tracked job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub job_id: JobId,
    /// True for the entire polling phase, not just between fetches.
    pub processing: bool,
    pub settled: bool,
    pub not_found: bool,
    pub total: u32,
    pub analyzed: u32,
    pub rows: Vec<ResumeRow>,
    pub notes: Vec<ProgressNote>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub draft: DraftView,
    pub banner: Option<BannerView>,
    pub submitting: bool,
    pub checking_description: bool,
    pub checking_duplicates: bool,
    pub duplicate_report: Option<DuplicateReport>,
    pub skipped_files: Vec<SkippedFile>,
    pub job: Option<JobView>,
    pub dirty: bool,
}

impl AppViewModel {
    pub(crate) fn project(state: &AppState) -> Self {
        let draft = &state.draft;
        let handles_live = draft.resumes.iter().all(SelectedFile::has_handle)
            && (draft.existing_job.is_some()
                || draft.jd_files.iter().all(SelectedFile::has_handle));
        let submit_enabled = !state.submitting
            && !draft.resumes.is_empty()
            && (!draft.jd_files.is_empty() || draft.existing_job.is_some())
            && handles_live;

        Self {
            draft: DraftView {
                jd_files: draft.jd_metas(),
                resumes: draft.resume_metas(),
                existing_job: draft.existing_job.clone(),
                awaiting_files: draft.awaiting_files,
                submit_enabled,
            },
            banner: state.banner.as_ref().map(|banner| BannerView {
                severity: banner.severity,
                text: banner.text.clone(),
            }),
            submitting: state.submitting,
            checking_description: state.jd_probe_pending,
            checking_duplicates: state.duplicate_probe_pending,
            duplicate_report: state.duplicate_report.clone(),
            skipped_files: state
                .last_receipt
                .as_ref()
                .map(|receipt| receipt.skipped_files.clone())
                .unwrap_or_default(),
            job: state.sync.as_ref().map(|sync| JobView {
                job_id: sync.job_id.clone(),
                processing: sync.phase == SyncPhase::Polling,
                settled: sync.is_settled(),
                not_found: sync.not_found,
                total: sync.snapshot.map(|s| s.total).unwrap_or_default(),
                analyzed: sync.snapshot.map(|s| s.analyzed).unwrap_or_default(),
                rows: sync.rows.clone(),
                notes: sync.notes.clone(),
            }),
            dirty: state.dirty,
        }
    }
}
