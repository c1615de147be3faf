//! Screener engine: backend IO and sync-loop execution.
mod client;
mod engine;
mod persist;
mod push;
mod sync;
mod types;

pub use client::{BackendApi, BackendSettings, HttpBackend};
pub use engine::{EngineHandle, EngineSettings};
pub use persist::{ensure_state_dir, remove_slot, AtomicFileWriter, PersistError};
pub use sync::{SyncHandle, DEFAULT_POLL_INTERVAL};
pub use types::{
    AnalyzeAccepted, BackendError, DescriptionUpload, DuplicateRecord, DuplicateReport,
    DuplicateSource, EngineEvent, FetchJobError, JdCheckResponse, JdFileRecord, JobDetail,
    JobFetchOutcome, JobSummary, ProgressEvent, ProgressKind, ResumeRecord, SkippedFile,
    SubmitRequest,
};
