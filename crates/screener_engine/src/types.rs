use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use thiserror::Error;

/// Accepts both string and numeric identifiers; the rest of the client
/// treats ids as opaque strings.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Response to an accepted `/api/analyze` upload. Processing continues in
/// the background server-side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzeAccepted {
    #[serde(deserialize_with = "opaque_id")]
    pub job_id: String,
    pub total_resumes: u32,
    #[serde(default)]
    pub is_existing_job: bool,
    #[serde(default)]
    pub duplicate_count: u32,
    #[serde(default)]
    pub skipped_files: Vec<SkippedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// One `/api/jobs/{id}` fetch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobDetail {
    #[serde(default)]
    pub resumes: Vec<ResumeRecord>,
}

/// A resume as the backend reports it. `analysis` is present exactly when
/// scoring has completed; its shape is opaque to this client apart from the
/// derived `bucket` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResumeRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
}

impl ResumeRecord {
    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn bucket(&self) -> Option<&str> {
        self.analysis
            .as_ref()
            .and_then(|analysis| analysis.get("bucket"))
            .and_then(serde_json::Value::as_str)
    }
}

/// Response to `/api/jd/check`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JdCheckResponse {
    pub exists: bool,
    pub message: String,
    #[serde(default)]
    pub job: Option<JobSummary>,
    #[serde(default)]
    pub jd_file: Option<JdFileRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSummary {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub resume_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JdFileRecord {
    pub filename: String,
    pub file_type: String,
    pub created_at: String,
    pub content: String,
}

/// Response to `/api/resumes/check-duplicates`, scoped to one target job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DuplicateReport {
    pub total_files: u32,
    pub unique_count: u32,
    pub duplicate_count: u32,
    #[serde(default)]
    pub duplicates: Vec<DuplicateRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DuplicateRecord {
    pub filename: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duplicate_of: Option<DuplicateSource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DuplicateSource {
    pub resume_filename: String,
    #[serde(deserialize_with = "opaque_id")]
    pub job_id: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
}

/// One push-channel frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Info,
    Success,
    Warning,
    Error,
    Processing,
    Complete,
}

/// Where the uploaded job description comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionUpload {
    /// Reuse content the backend already stores instead of re-uploading.
    Stored {
        existing_job_id: Option<String>,
        filename: String,
        content: String,
    },
    Files(Vec<PathBuf>),
}

/// Everything needed to build the `/api/analyze` multipart payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub description: DescriptionUpload,
    pub resumes: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("server returned status {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchJobError {
    #[error("job not found")]
    NotFound,
    #[error("transport failure: {0}")]
    Transport(String),
}

/// One poll result for a tracked job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobFetchOutcome {
    Fetched(JobDetail),
    NotFound,
    Transport(String),
}

/// Events the engine hands back to the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SubmitFinished(Result<AnalyzeAccepted, BackendError>),
    JdProbeFinished(Result<JdCheckResponse, BackendError>),
    DuplicateProbeFinished(Result<DuplicateReport, BackendError>),
    JobFetched {
        job_id: String,
        outcome: JobFetchOutcome,
    },
    Push {
        job_id: String,
        event: ProgressEvent,
    },
}
