use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use crate::types::{
    AnalyzeAccepted, BackendError, DescriptionUpload, DuplicateReport, FetchJobError,
    JdCheckResponse, JobDetail, SubmitRequest,
};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub ws_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            ws_url: "ws://127.0.0.1:5000/ws".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The narrow HTTP contract this client consumes. A trait so tests and the
/// sync loop can run against fakes.
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    async fn submit_batch(&self, request: &SubmitRequest) -> Result<AnalyzeAccepted, BackendError>;
    async fn fetch_job(&self, job_id: &str) -> Result<JobDetail, FetchJobError>;
    async fn check_job_description(&self, file: &Path) -> Result<JdCheckResponse, BackendError>;
    async fn check_duplicates(
        &self,
        files: &[PathBuf],
        job_id: &str,
    ) -> Result<DuplicateReport, BackendError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn file_part(path: &Path) -> Result<Part, BackendError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            BackendError::Transport(format!("reading {}: {err}", path.display()))
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Part::bytes(bytes).file_name(filename))
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

#[async_trait::async_trait]
impl BackendApi for HttpBackend {
    async fn submit_batch(&self, request: &SubmitRequest) -> Result<AnalyzeAccepted, BackendError> {
        let mut form = Form::new();
        match &request.description {
            DescriptionUpload::Stored {
                existing_job_id,
                filename,
                content,
            } => {
                form = form.text(
                    "job_description",
                    format!("Job description from file: {filename}\n\n{content}"),
                );
                if let Some(job_id) = existing_job_id {
                    form = form.text("existing_job_id", job_id.clone());
                }
            }
            DescriptionUpload::Files(paths) => {
                let mut names = Vec::with_capacity(paths.len());
                for path in paths {
                    names.push(
                        path.file_name()
                            .and_then(|name| name.to_str())
                            .unwrap_or("upload")
                            .to_string(),
                    );
                    form = form.part("job_description_files", Self::file_part(path).await?);
                }
                // Plain-text fallback kept alongside the raw files.
                form = form.text(
                    "job_description",
                    format!("Job description from files: {}", names.join(", ")),
                );
            }
        }
        for path in &request.resumes {
            form = form.part("resumes", Self::file_part(path).await?);
        }

        let response = self
            .client
            .post(self.endpoint("/api/analyze"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn fetch_job(&self, job_id: &str) -> Result<JobDetail, FetchJobError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/jobs/{job_id}")))
            .send()
            .await
            .map_err(|err| FetchJobError::Transport(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchJobError::NotFound);
        }
        // Anything else non-2xx is transient from the poll loop's point of
        // view; only a 404 is terminal.
        if !status.is_success() {
            return Err(FetchJobError::Transport(format!("status {status}")));
        }
        response
            .json::<JobDetail>()
            .await
            .map_err(|err| FetchJobError::Transport(err.to_string()))
    }

    async fn check_job_description(&self, file: &Path) -> Result<JdCheckResponse, BackendError> {
        let form = Form::new().part("jd_file", Self::file_part(file).await?);
        let response = self
            .client
            .post(self.endpoint("/api/jd/check"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn check_duplicates(
        &self,
        files: &[PathBuf],
        job_id: &str,
    ) -> Result<DuplicateReport, BackendError> {
        let mut form = Form::new().text("job_id", job_id.to_string());
        for path in files {
            form = form.part("resumes", Self::file_part(path).await?);
        }
        let response = self
            .client
            .post(self.endpoint("/api/resumes/check-duplicates"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }
}
