use crate::draft::{DraftBatch, ExistingJobMatch, SelectedFile};
use crate::state::{
    DuplicateReport, JobId, ProbeFailure, ProgressNote, ResumeRow, SubmitFailure, SubmitReceipt,
};

/// Outcome of the description probe against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum JdProbeOutcome {
    /// The backend already knows this description.
    Match {
        found: ExistingJobMatch,
        message: String,
    },
    /// No stored description matched; the message is shown briefly.
    NoMatch { message: String },
    /// Probe failed; treated as no match, with a warning.
    Failed(ProbeFailure),
}

/// One poll result for the active job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobFetchOutcome {
    Snapshot(Vec<ResumeRow>),
    /// 404: terminal for this job.
    NotFound,
    /// Transient transport failure; the loop retries on the next tick.
    Transport(String),
}

/// Every input to the state machine. User actions, poll results and push
/// events all arrive through this one type, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked (or cleared) job description files.
    JdFilesChosen(Vec<SelectedFile>),
    /// User picked (or cleared) resume files.
    ResumeFilesChosen(Vec<SelectedFile>),
    /// A persisted draft was restored after a warm navigation.
    DraftRestored(DraftBatch),
    /// User discarded the draft.
    ClearDraftClicked,
    /// Description probe finished.
    JdProbeResolved(JdProbeOutcome),
    /// User asked for a duplicate check against the resolved job.
    DuplicateCheckClicked,
    /// Duplicate probe finished.
    DuplicateProbeResolved(Result<DuplicateReport, ProbeFailure>),
    /// User submitted the batch.
    SubmitClicked,
    /// Backend accepted the batch for background processing.
    SubmitAccepted(SubmitReceipt),
    /// Submission failed; the form becomes editable again.
    SubmitFailed(SubmitFailure),
    /// A job detail view was opened.
    JobOpened { job_id: JobId },
    /// The job detail view was left.
    JobClosed,
    /// Poll source result for a job.
    JobFetched {
        job_id: JobId,
        outcome: JobFetchOutcome,
    },
    /// Push source event for a job.
    PushNote { job_id: JobId, note: ProgressNote },
    /// Human override of a resume's derived bucket.
    BucketOverridden { resume_id: String, bucket: String },
    /// A scheduled banner auto-clear fired.
    BannerExpired { token: u64 },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
