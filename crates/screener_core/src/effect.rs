use crate::draft::{DraftBatch, SelectedFile};
use crate::state::JobId;

/// Where the submitted job description comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionSource {
    /// Reuse stored content from a resolved match instead of re-uploading.
    /// `existing_job_id` tags the request when a job already exists.
    Stored {
        existing_job_id: Option<JobId>,
        filename: String,
        content: String,
    },
    /// Upload the raw description files.
    Files(Vec<SelectedFile>),
}

/// Everything the engine needs to build the upload payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub description: DescriptionSource,
    pub resumes: Vec<SelectedFile>,
}

/// Side effects requested by the reducer, run by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the draft slots.
    SaveDraft(DraftBatch),
    /// Remove all persisted draft slots.
    ClearDraft,
    /// Ask the backend whether this description is already known.
    ProbeJobDescription { file: SelectedFile },
    /// Check the candidate files for duplicates within the target job.
    ProbeDuplicates {
        files: Vec<SelectedFile>,
        job_id: JobId,
    },
    /// Upload the batch for background analysis.
    SubmitBatch(SubmissionPlan),
    /// Start the poll loop and push subscription for a job.
    StartSync { job_id: JobId },
    /// Tear down the active poll loop and push subscription.
    StopSync,
    /// Tell the view layer to open the job's detail view.
    NavigateToJob { job_id: JobId },
    /// Arm an auto-clear for the banner identified by `token`.
    ScheduleBannerClear { token: u64, after_secs: u64 },
}
