use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};

use crate::client::{BackendApi, BackendSettings, HttpBackend};
use crate::sync::{start_sync, SyncHandle, DEFAULT_POLL_INTERVAL};
use crate::types::{EngineEvent, SubmitRequest};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub backend: BackendSettings,
    pub poll_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

enum EngineCommand {
    Submit(SubmitRequest),
    ProbeJd { file: PathBuf },
    ProbeDuplicates { files: Vec<PathBuf>, job_id: String },
    StartSync { job_id: String },
    StopSync,
}

/// Handle to the engine thread. Commands go in over a channel; results come
/// back as [`EngineEvent`]s drained with [`EngineHandle::try_recv`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_engine(settings, cmd_rx, event_tx));

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn submit(&self, request: SubmitRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit(request));
    }

    pub fn probe_jd(&self, file: PathBuf) {
        let _ = self.cmd_tx.send(EngineCommand::ProbeJd { file });
    }

    pub fn probe_duplicates(&self, files: Vec<PathBuf>, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::ProbeDuplicates {
            files,
            job_id: job_id.into(),
        });
    }

    pub fn start_sync(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::StartSync {
            job_id: job_id.into(),
        });
    }

    pub fn stop_sync(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopSync);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

fn run_engine(
    settings: EngineSettings,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let client: Arc<dyn BackendApi> = match HttpBackend::new(settings.backend.clone()) {
        Ok(backend) => Arc::new(backend),
        Err(err) => {
            engine_error!("backend client init failed: {}", err);
            return;
        }
    };

    // At most one sync loop is alive; a new job id replaces the old loop.
    let mut active_sync: Option<SyncHandle> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Submit(request) => {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = client.submit_batch(&request).await;
                    let _ = event_tx.send(EngineEvent::SubmitFinished(result));
                });
            }
            EngineCommand::ProbeJd { file } => {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = client.check_job_description(&file).await;
                    let _ = event_tx.send(EngineEvent::JdProbeFinished(result));
                });
            }
            EngineCommand::ProbeDuplicates { files, job_id } => {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = client.check_duplicates(&files, &job_id).await;
                    let _ = event_tx.send(EngineEvent::DuplicateProbeFinished(result));
                });
            }
            EngineCommand::StartSync { job_id } => {
                if let Some(handle) = active_sync.take() {
                    engine_info!("replacing sync for job {}", handle.job_id());
                    handle.stop();
                }
                active_sync = Some(start_sync(
                    runtime.handle(),
                    client.clone(),
                    &settings,
                    job_id,
                    event_tx.clone(),
                ));
            }
            EngineCommand::StopSync => {
                if let Some(handle) = active_sync.take() {
                    handle.stop();
                }
            }
        }
    }
}
