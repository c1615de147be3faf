use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use screener_core::{update, AppState, AppViewModel, Effect, Msg};
use screener_engine::EngineHandle;

use super::coldstart::{was_cold_start, FileSessionStore, ReloadFlag, VisitGap, COLD_START_GAP_MS};
use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::persistence::{DraftStore, FileDraftStore};

/// Message drain cadence for the headless shell.
const PUMP_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() {
    logging::initialize(logging::LogDestination::File);
    let settings = config::from_env();
    engine_info!(
        "screener starting; backend {}, state dir {:?}",
        settings.engine.backend.base_url,
        settings.state_dir
    );

    let store: Arc<dyn DraftStore> = Arc::new(FileDraftStore::new(settings.state_dir.clone()));
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    // Reload-vs-navigation is decided once, before anything is restored.
    let session = FileSessionStore::shared_slot();
    let gap = VisitGap::new(&session, COLD_START_GAP_MS);
    let reload = ReloadFlag(settings.force_cold_start);
    if was_cold_start(&[&reload, &gap]) {
        engine_info!("cold start; discarding any persisted draft");
        store.clear();
    } else if let Some(draft) = store.load() {
        engine_info!("warm start; restoring draft metadata");
        let _ = msg_tx.send(Msg::DraftRestored(draft));
    }

    let engine = EngineHandle::new(settings.engine.clone());
    let runner = EffectRunner::new(engine, store.clone(), msg_tx.clone());
    let mut state = AppState::with_policy(settings.policy);

    let quit_requested = Arc::new(AtomicBool::new(false));
    let input_closed = Arc::new(AtomicBool::new(false));
    spawn_quit_listener(quit_requested.clone(), input_closed.clone());

    let mut guard = DiscardGuard::default();
    loop {
        while let Ok(msg) = msg_rx.try_recv() {
            state = dispatch(state, msg, &runner);
        }
        if quit_requested.swap(false, Ordering::SeqCst) {
            let has_unsaved = has_unsaved_draft(&state.view());
            // With stdin gone there is nobody left to confirm with; the
            // guard cannot block the exit then.
            if input_closed.load(Ordering::SeqCst) || guard.allow_exit(has_unsaved) {
                break;
            }
        }
        thread::sleep(PUMP_INTERVAL);
    }

    // Actual unload: tear the sync loop down and leave no draft slots
    // behind, whatever the confirmation said about the in-memory draft.
    runner.run(vec![Effect::StopSync]);
    store.clear();
    engine_info!("screener exiting");
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    runner.run(effects);
    if state.consume_dirty() {
        render(&state.view());
    }
    state
}

/// The excluded view layer boils down to log lines in the headless shell.
fn render(view: &AppViewModel) {
    if let Some(banner) = &view.banner {
        engine_info!("[{:?}] {}", banner.severity, banner.text);
    }
    if view.submitting {
        engine_info!("submitting batch...");
    } else if !view.draft.resumes.is_empty() || !view.draft.jd_files.is_empty() {
        engine_info!(
            "draft: {} description file(s), {} resume(s){}",
            view.draft.jd_files.len(),
            view.draft.resumes.len(),
            if view.draft.awaiting_files {
                " (re-select files to continue)"
            } else {
                ""
            }
        );
    }
    if let Some(job) = &view.job {
        if job.not_found {
            engine_info!("job {}: not found", job.job_id);
        } else if job.processing {
            engine_info!(
                "job {}: analyzing ({}/{} resumes scored)",
                job.job_id,
                job.analyzed,
                job.total
            );
        } else {
            engine_info!(
                "job {}: analysis complete ({} resumes)",
                job.job_id,
                job.total
            );
        }
    }
}

fn has_unsaved_draft(view: &AppViewModel) -> bool {
    !view.draft.jd_files.is_empty() || !view.draft.resumes.is_empty()
}

/// Blocking exit confirmation: the first quit with staged files only warns,
/// the second goes through.
#[derive(Default)]
struct DiscardGuard {
    warned: bool,
}

impl DiscardGuard {
    fn allow_exit(&mut self, has_unsaved: bool) -> bool {
        if has_unsaved && !self.warned {
            self.warned = true;
            engine_warn!("Draft files are still staged; quit again to discard them.");
            return false;
        }
        true
    }
}

fn spawn_quit_listener(quit_requested: Arc<AtomicBool>, input_closed: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(command) if command.trim() == "q" => {
                    quit_requested.store(true, Ordering::SeqCst);
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        input_closed.store(true, Ordering::SeqCst);
        quit_requested.store(true, Ordering::SeqCst);
    });
}
