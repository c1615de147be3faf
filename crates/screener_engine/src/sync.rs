use std::sync::{mpsc, Arc};
use std::time::Duration;

use engine_logging::engine_debug;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::BackendApi;
use crate::engine::EngineSettings;
use crate::push::run_push_channel;
use crate::types::{EngineEvent, FetchJobError, JobFetchOutcome};

/// Default spacing between job fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Owner of one job's poll loop and push subscription.
///
/// Both tasks live under one cancellation token, so `stop()` (or dropping
/// the handle on any exit path) tears the timer and the channel down
/// together. A new job id always gets a new handle.
pub struct SyncHandle {
    job_id: String,
    cancel: CancellationToken,
}

impl SyncHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) fn start_sync(
    runtime: &tokio::runtime::Handle,
    client: Arc<dyn BackendApi>,
    settings: &EngineSettings,
    job_id: String,
    event_tx: mpsc::Sender<EngineEvent>,
) -> SyncHandle {
    let cancel = CancellationToken::new();

    let poll_cancel = cancel.clone();
    let poll_job = job_id.clone();
    let poll_tx = event_tx.clone();
    let poll_interval = settings.poll_interval;
    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = poll_cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }
            let outcome = match client.fetch_job(&poll_job).await {
                Ok(detail) => JobFetchOutcome::Fetched(detail),
                Err(FetchJobError::NotFound) => JobFetchOutcome::NotFound,
                Err(FetchJobError::Transport(message)) => {
                    engine_debug!(
                        "poll for job {} failed, retrying next tick: {}",
                        poll_job,
                        message
                    );
                    JobFetchOutcome::Transport(message)
                }
            };
            let terminal = matches!(outcome, JobFetchOutcome::NotFound);
            // A fetch resolving after teardown must not leak its result.
            if poll_cancel.is_cancelled() {
                return;
            }
            let sent = poll_tx.send(EngineEvent::JobFetched {
                job_id: poll_job.clone(),
                outcome,
            });
            if sent.is_err() || terminal {
                return;
            }
        }
    });

    runtime.spawn(run_push_channel(
        settings.backend.ws_url.clone(),
        job_id.clone(),
        cancel.clone(),
        event_tx,
    ));

    SyncHandle { job_id, cancel }
}
