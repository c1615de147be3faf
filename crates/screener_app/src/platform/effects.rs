use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use screener_core::{
    DescriptionSource, DuplicateEntry, DuplicateOrigin, DuplicateReport, Effect, ExistingJobMatch,
    JdProbeOutcome, JobFetchOutcome, JobId, JobRef, Msg, NoteKind, ProbeFailure, ProgressNote,
    ResumeRow, SelectedFile, SkippedFile, StoredJdFile, SubmitFailure, SubmitReceipt,
    SubmissionPlan,
};
use screener_engine::{
    BackendError, DescriptionUpload, EngineEvent, EngineHandle, ProgressKind, SubmitRequest,
};

use super::persistence::DraftStore;

/// Runs the reducer's effects against the engine and the draft store, and
/// pumps engine events back into the message queue.
pub struct EffectRunner {
    engine: EngineHandle,
    store: Arc<dyn DraftStore>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, store: Arc<dyn DraftStore>, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self {
            engine: engine.clone(),
            store,
            msg_tx: msg_tx.clone(),
        };
        spawn_event_pump(engine, msg_tx);
        runner
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SaveDraft(batch) => self.store.save(&batch),
                Effect::ClearDraft => self.store.clear(),
                Effect::ProbeJobDescription { file } => match file.path {
                    Some(path) => self.engine.probe_jd(path),
                    None => {
                        engine_warn!(
                            "description probe skipped: no live handle for {}",
                            file.meta.name
                        );
                    }
                },
                Effect::ProbeDuplicates { files, job_id } => {
                    self.engine
                        .probe_duplicates(live_paths(&files), job_id.as_str());
                }
                Effect::SubmitBatch(plan) => self.engine.submit(upload_request(plan)),
                Effect::StartSync { job_id } => {
                    engine_info!("starting sync for job {}", job_id);
                    self.engine.start_sync(job_id.as_str());
                }
                Effect::StopSync => self.engine.stop_sync(),
                Effect::NavigateToJob { job_id } => {
                    // The headless shell opens the detail view directly.
                    let _ = self.msg_tx.send(Msg::JobOpened { job_id });
                }
                Effect::ScheduleBannerClear { token, after_secs } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_secs(after_secs));
                        let _ = msg_tx.send(Msg::BannerExpired { token });
                    });
                }
            }
        }
    }
}

fn spawn_event_pump(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || loop {
        if let Some(event) = engine.try_recv() {
            if msg_tx.send(map_engine_event(event)).is_err() {
                return;
            }
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn live_paths(files: &[SelectedFile]) -> Vec<PathBuf> {
    files
        .iter()
        .filter_map(|file| file.path.clone())
        .collect()
}

fn upload_request(plan: SubmissionPlan) -> SubmitRequest {
    let description = match plan.description {
        DescriptionSource::Stored {
            existing_job_id,
            filename,
            content,
        } => DescriptionUpload::Stored {
            existing_job_id: existing_job_id.map(|id| id.as_str().to_string()),
            filename,
            content,
        },
        DescriptionSource::Files(files) => DescriptionUpload::Files(live_paths(&files)),
    };
    SubmitRequest {
        description,
        resumes: live_paths(&plan.resumes),
    }
}

fn map_engine_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmitFinished(Ok(accepted)) => Msg::SubmitAccepted(SubmitReceipt {
            job_id: JobId::new(accepted.job_id),
            total_resumes: accepted.total_resumes,
            is_existing_job: accepted.is_existing_job,
            duplicate_count: accepted.duplicate_count,
            skipped_files: accepted
                .skipped_files
                .into_iter()
                .map(|skipped| SkippedFile {
                    filename: skipped.filename,
                    reason: skipped.reason,
                })
                .collect(),
        }),
        EngineEvent::SubmitFinished(Err(err)) => Msg::SubmitFailed(match err {
            BackendError::Status(code) => SubmitFailure::Status(code),
            BackendError::Transport(message) | BackendError::Decode(message) => {
                SubmitFailure::Transport(message)
            }
        }),
        EngineEvent::JdProbeFinished(Ok(response)) => {
            let outcome = match (response.exists, response.jd_file) {
                (true, Some(jd_file)) => JdProbeOutcome::Match {
                    found: ExistingJobMatch {
                        job: response.job.map(|job| JobRef {
                            id: JobId::new(job.id),
                            resume_count: job.resume_count,
                        }),
                        jd_file: StoredJdFile {
                            filename: jd_file.filename,
                            file_type: jd_file.file_type,
                            created_at: jd_file.created_at,
                            content: jd_file.content,
                        },
                    },
                    message: response.message,
                },
                _ => JdProbeOutcome::NoMatch {
                    message: response.message,
                },
            };
            Msg::JdProbeResolved(outcome)
        }
        EngineEvent::JdProbeFinished(Err(err)) => {
            Msg::JdProbeResolved(JdProbeOutcome::Failed(probe_failure(err)))
        }
        EngineEvent::DuplicateProbeFinished(Ok(report)) => {
            Msg::DuplicateProbeResolved(Ok(DuplicateReport {
                total_files: report.total_files,
                unique_count: report.unique_count,
                duplicate_count: report.duplicate_count,
                duplicates: report
                    .duplicates
                    .into_iter()
                    .map(|record| DuplicateEntry {
                        filename: record.filename,
                        error: record.error,
                        duplicate_of: record.duplicate_of.map(|source| DuplicateOrigin {
                            resume_filename: source.resume_filename,
                            job_id: JobId::new(source.job_id),
                            candidate_name: source.candidate_name,
                        }),
                    })
                    .collect(),
            }))
        }
        EngineEvent::DuplicateProbeFinished(Err(err)) => {
            Msg::DuplicateProbeResolved(Err(probe_failure(err)))
        }
        EngineEvent::JobFetched { job_id, outcome } => Msg::JobFetched {
            job_id: JobId::new(job_id),
            outcome: match outcome {
                screener_engine::JobFetchOutcome::Fetched(detail) => JobFetchOutcome::Snapshot(
                    detail.resumes.into_iter().map(resume_row).collect(),
                ),
                screener_engine::JobFetchOutcome::NotFound => JobFetchOutcome::NotFound,
                screener_engine::JobFetchOutcome::Transport(message) => {
                    JobFetchOutcome::Transport(message)
                }
            },
        },
        EngineEvent::Push { job_id, event } => Msg::PushNote {
            job_id: JobId::new(job_id),
            note: ProgressNote {
                kind: note_kind(event.kind),
                message: event.message,
                timestamp: event.timestamp,
            },
        },
    }
}

fn probe_failure(err: BackendError) -> ProbeFailure {
    match err {
        BackendError::Status(code) => ProbeFailure::Status(code),
        BackendError::Transport(message) | BackendError::Decode(message) => {
            ProbeFailure::Transport(message)
        }
    }
}

fn resume_row(record: screener_engine::ResumeRecord) -> ResumeRow {
    let analyzed = record.is_analyzed();
    let bucket = record.bucket().map(str::to_string);
    ResumeRow {
        id: record.id,
        filename: record.filename,
        candidate_name: record.candidate_name,
        analyzed,
        bucket,
    }
}

fn note_kind(kind: ProgressKind) -> NoteKind {
    match kind {
        ProgressKind::Info => NoteKind::Info,
        ProgressKind::Success => NoteKind::Success,
        ProgressKind::Warning => NoteKind::Warning,
        ProgressKind::Error => NoteKind::Error,
        ProgressKind::Processing => NoteKind::Processing,
        ProgressKind::Complete => NoteKind::Complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_complete_frame_becomes_a_complete_note() {
        let msg = map_engine_event(EngineEvent::Push {
            job_id: "42".to_string(),
            event: screener_engine::ProgressEvent {
                kind: ProgressKind::Complete,
                message: "Analysis complete".to_string(),
                timestamp: 1_756_000_000.0,
            },
        });
        let Msg::PushNote { job_id, note } = msg else {
            panic!("expected PushNote");
        };
        assert_eq!(job_id, JobId::new("42"));
        assert_eq!(note.kind, NoteKind::Complete);
    }

    #[test]
    fn a_matchless_probe_response_maps_to_no_match() {
        let msg = map_engine_event(EngineEvent::JdProbeFinished(Ok(
            screener_engine::JdCheckResponse {
                exists: false,
                message: "no match".to_string(),
                job: None,
                jd_file: None,
            },
        )));
        assert!(matches!(
            msg,
            Msg::JdProbeResolved(JdProbeOutcome::NoMatch { .. })
        ));
    }

    #[test]
    fn decode_failures_surface_as_transport() {
        let msg = map_engine_event(EngineEvent::SubmitFinished(Err(BackendError::Decode(
            "bad json".to_string(),
        ))));
        assert!(matches!(
            msg,
            Msg::SubmitFailed(SubmitFailure::Transport(_))
        ));
    }
}
