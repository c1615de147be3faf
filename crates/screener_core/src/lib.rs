//! Screener core: pure state machine and view-model helpers.
//!
//! Every input reaches the state through one ordered message queue: user
//! actions, poll results and push-channel events are all [`Msg`] values fed
//! to the pure [`update`] function, which returns the next state plus the
//! side effects the platform layer should run. No IO happens here.
mod draft;
mod effect;
mod msg;
mod stability;
mod state;
mod update;
mod view_model;

pub use draft::{DraftBatch, ExistingJobMatch, FileMeta, JobRef, SelectedFile, StoredJdFile};
pub use effect::{DescriptionSource, Effect, SubmissionPlan};
pub use msg::{JdProbeOutcome, JobFetchOutcome, Msg};
pub use stability::{ProcessingSnapshot, StabilityTracker, SyncPolicy, DEFAULT_STABLE_TICKS};
pub use state::{
    AppState, Banner, DuplicateEntry, DuplicateOrigin, DuplicateReport, JobId, NoteKind,
    ProbeFailure, ProgressNote, ResumeRow, Severity, SkippedFile, SubmitFailure, SubmitReceipt,
    SyncPhase,
};
pub use update::update;
pub use view_model::{AppViewModel, BannerView, DraftView, JobView};
