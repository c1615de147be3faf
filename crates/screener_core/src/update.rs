use crate::draft::SelectedFile;
use crate::effect::{DescriptionSource, Effect, SubmissionPlan};
use crate::msg::{JdProbeOutcome, JobFetchOutcome, Msg};
use crate::state::{
    AppState, DuplicateReport, JobId, NoteKind, ProbeFailure, ProgressNote, Severity,
    SubmitFailure, SubmitReceipt, SyncState,
};

/// How long a "no stored description matched" notice stays up.
const NO_MATCH_BANNER_SECS: u64 = 3;
/// How long a duplicate-probe summary stays up.
const DUPLICATE_BANNER_SECS: u64 = 5;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::JdFilesChosen(files) => apply_jd_files_chosen(&mut state, files),
        Msg::ResumeFilesChosen(files) => apply_resume_files_chosen(&mut state, files),
        Msg::DraftRestored(batch) => {
            // Only meaningful before the user has touched the form.
            if state.draft.is_empty() && !state.submitting {
                state.draft.restore(batch);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ClearDraftClicked => {
            if state.submitting {
                return (state, Vec::new());
            }
            state.draft = Default::default();
            state.duplicate_report = None;
            state.banner = None;
            state.mark_dirty();
            vec![Effect::ClearDraft]
        }
        Msg::JdProbeResolved(outcome) => apply_jd_probe(&mut state, outcome),
        Msg::DuplicateCheckClicked => apply_duplicate_check_clicked(&mut state),
        Msg::DuplicateProbeResolved(result) => apply_duplicate_probe(&mut state, result),
        Msg::SubmitClicked => apply_submit_clicked(&mut state),
        Msg::SubmitAccepted(receipt) => apply_submit_accepted(&mut state, receipt),
        Msg::SubmitFailed(failure) => {
            state.submitting = false;
            let text = match failure {
                SubmitFailure::Status(code) => {
                    format!("Submission failed: server returned status {code}.")
                }
                SubmitFailure::Transport(message) => format!("Submission failed: {message}."),
            };
            state.set_banner(Severity::Error, text);
            Vec::new()
        }
        Msg::JobOpened { job_id } => apply_job_opened(&mut state, job_id),
        Msg::JobClosed => {
            if state.sync.take().is_some() {
                state.mark_dirty();
                vec![Effect::StopSync]
            } else {
                Vec::new()
            }
        }
        Msg::JobFetched { job_id, outcome } => apply_job_fetch(&mut state, job_id, outcome),
        Msg::PushNote { job_id, note } => apply_push_note(&mut state, job_id, note),
        Msg::BucketOverridden { resume_id, bucket } => {
            apply_bucket_override(&mut state, &resume_id, bucket)
        }
        Msg::BannerExpired { token } => {
            state.expire_banner(token);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_jd_files_chosen(state: &mut AppState, files: Vec<SelectedFile>) -> Vec<Effect> {
    if state.submitting {
        return Vec::new();
    }
    state.draft.jd_files = files;
    state.draft.existing_job = None;
    state.draft.awaiting_files = false;
    state.banner = None;
    state.jd_probe_pending = false;
    state.mark_dirty();

    let mut effects = Vec::new();
    // Probing needs the file content, so a restored metadata-only entry
    // cannot trigger it.
    if let Some(first) = state.draft.jd_files.first() {
        if first.has_handle() {
            state.jd_probe_pending = true;
            effects.push(Effect::ProbeJobDescription {
                file: first.clone(),
            });
        }
    }
    effects.push(persist_draft_effect(state));
    effects
}

fn apply_resume_files_chosen(state: &mut AppState, files: Vec<SelectedFile>) -> Vec<Effect> {
    if state.submitting {
        return Vec::new();
    }
    state.draft.resumes = files;
    state.draft.awaiting_files = false;
    // Any previous duplicate report described a different candidate set.
    state.duplicate_report = None;
    state.mark_dirty();
    vec![persist_draft_effect(state)]
}

/// The draft occupies a single persisted slot: save the current snapshot,
/// or drop the slot entirely once the draft is empty.
fn persist_draft_effect(state: &AppState) -> Effect {
    if state.draft.is_empty() {
        Effect::ClearDraft
    } else {
        Effect::SaveDraft(state.draft.snapshot())
    }
}

fn apply_jd_probe(state: &mut AppState, outcome: JdProbeOutcome) -> Vec<Effect> {
    state.jd_probe_pending = false;
    match outcome {
        JdProbeOutcome::Match { found, message } => {
            state.draft.existing_job = Some(found);
            state.set_banner(Severity::Info, message);
            vec![Effect::SaveDraft(state.draft.snapshot())]
        }
        JdProbeOutcome::NoMatch { message } => {
            let token = state.set_banner(Severity::Info, message);
            vec![Effect::ScheduleBannerClear {
                token,
                after_secs: NO_MATCH_BANNER_SECS,
            }]
        }
        JdProbeOutcome::Failed(_) => {
            // Fail open: the description is simply treated as new.
            state.set_banner(
                Severity::Warning,
                "Could not check for an existing job description; proceeding with upload.",
            );
            Vec::new()
        }
    }
}

fn apply_duplicate_check_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.submitting || state.duplicate_probe_pending {
        return Vec::new();
    }
    if state.draft.resumes.is_empty() {
        state.set_banner(Severity::Error, "Upload résumés first.");
        return Vec::new();
    }
    // Duplicate checking is always scoped to one resolved job, never global.
    let Some(job) = state
        .draft
        .existing_job
        .as_ref()
        .and_then(|found| found.job.as_ref())
    else {
        state.set_banner(
            Severity::Error,
            "Upload a job description file first to check for duplicates within a specific job.",
        );
        return Vec::new();
    };
    let job_id = job.id.clone();
    if !state.draft.resumes.iter().all(SelectedFile::has_handle) {
        state.set_banner(
            Severity::Error,
            "Re-select the résumé files to continue; a restored draft keeps metadata only.",
        );
        return Vec::new();
    }
    state.duplicate_probe_pending = true;
    state.duplicate_report = None;
    state.mark_dirty();
    vec![Effect::ProbeDuplicates {
        files: state.draft.resumes.clone(),
        job_id,
    }]
}

fn apply_duplicate_probe(
    state: &mut AppState,
    result: Result<DuplicateReport, ProbeFailure>,
) -> Vec<Effect> {
    state.duplicate_probe_pending = false;
    match result {
        Ok(report) => {
            let text = if report.duplicate_count > 0 {
                format!(
                    "Found {} duplicate résumés in the target job; {} unique résumés will be processed.",
                    report.duplicate_count, report.unique_count
                )
            } else {
                format!(
                    "All {} résumés are unique within the target job.",
                    report.total_files
                )
            };
            let token = state.set_banner(Severity::Info, text);
            state.duplicate_report = Some(report);
            vec![Effect::ScheduleBannerClear {
                token,
                after_secs: DUPLICATE_BANNER_SECS,
            }]
        }
        Err(_) => {
            // Duplicate detection is an optimization, not a gate: on failure
            // the submission proceeds as if no duplicates were found.
            state.set_banner(
                Severity::Warning,
                "Could not check for duplicate résumés; proceeding as if none were found.",
            );
            Vec::new()
        }
    }
}

fn apply_submit_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.submitting {
        return Vec::new();
    }
    if state.draft.jd_files.is_empty() && state.draft.existing_job.is_none() {
        state.set_banner(
            Severity::Error,
            "Upload at least one job description file.",
        );
        return Vec::new();
    }
    if state.draft.resumes.is_empty() {
        state.set_banner(Severity::Error, "Upload at least one résumé.");
        return Vec::new();
    }
    let resumes_live = state.draft.resumes.iter().all(SelectedFile::has_handle);
    let description_live = state.draft.existing_job.is_some()
        || state.draft.jd_files.iter().all(SelectedFile::has_handle);
    if !resumes_live || !description_live {
        state.set_banner(
            Severity::Error,
            "Re-select the original files to continue; a restored draft keeps metadata only.",
        );
        return Vec::new();
    }

    let description = match &state.draft.existing_job {
        Some(found) => DescriptionSource::Stored {
            existing_job_id: found.job.as_ref().map(|job| job.id.clone()),
            filename: found.jd_file.filename.clone(),
            content: found.jd_file.content.clone(),
        },
        None => DescriptionSource::Files(state.draft.jd_files.clone()),
    };
    let plan = SubmissionPlan {
        description,
        resumes: state.draft.resumes.clone(),
    };
    state.submitting = true;
    state.banner = None;
    state.mark_dirty();
    vec![Effect::SubmitBatch(plan)]
}

fn apply_submit_accepted(state: &mut AppState, receipt: SubmitReceipt) -> Vec<Effect> {
    state.submitting = false;
    state.draft = Default::default();
    state.duplicate_report = None;

    let mut text = format!(
        "Analysis queued: {} résumés are being processed in the background.",
        receipt.total_resumes
    );
    if receipt.is_existing_job {
        text.push_str(&format!(
            " Processing under existing job {}.",
            receipt.job_id
        ));
    }
    if receipt.duplicate_count > 0 {
        text.push_str(&format!(
            " {} duplicate résumés were skipped.",
            receipt.duplicate_count
        ));
    }
    state.set_banner(Severity::Success, text);

    let job_id = receipt.job_id.clone();
    state.sync = Some(SyncState::new(job_id.clone()));
    state.last_receipt = Some(receipt);
    vec![
        Effect::ClearDraft,
        Effect::StartSync {
            job_id: job_id.clone(),
        },
        Effect::NavigateToJob { job_id },
    ]
}

fn apply_job_opened(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    if let Some(sync) = &state.sync {
        // Already syncing this job (e.g. navigation right after submit).
        if sync.job_id == job_id && !sync.is_settled() {
            return Vec::new();
        }
    }
    state.sync = Some(SyncState::new(job_id.clone()));
    state.mark_dirty();
    vec![Effect::StartSync { job_id }]
}

fn apply_job_fetch(state: &mut AppState, job_id: JobId, outcome: JobFetchOutcome) -> Vec<Effect> {
    enum Applied {
        Snapshot { settle: bool },
        NotFound,
        Skipped,
    }

    let policy = state.policy;
    let applied = match state.sync.as_mut() {
        // Results for a closed or superseded job, and anything arriving
        // after settlement, are dropped: settling is monotonic.
        Some(sync) if sync.job_id == job_id && !sync.is_settled() => match outcome {
            JobFetchOutcome::Snapshot(rows) => {
                let run = sync.apply_rows(rows);
                let settle = sync
                    .snapshot
                    .is_some_and(|snapshot| policy.should_settle(snapshot, run));
                if settle {
                    sync.settle();
                }
                Applied::Snapshot { settle }
            }
            JobFetchOutcome::NotFound => {
                sync.not_found = true;
                sync.settle();
                Applied::NotFound
            }
            // Transient transport failure: never surfaced, the stable run is
            // kept, the loop just retries on the next tick.
            JobFetchOutcome::Transport(_) => Applied::Skipped,
        },
        _ => Applied::Skipped,
    };

    match applied {
        Applied::Snapshot { settle } => {
            state.mark_dirty();
            if settle {
                vec![Effect::StopSync]
            } else {
                Vec::new()
            }
        }
        Applied::NotFound => {
            state.set_banner(Severity::Error, "Job not found.");
            vec![Effect::StopSync]
        }
        Applied::Skipped => Vec::new(),
    }
}

fn apply_push_note(state: &mut AppState, job_id: JobId, note: ProgressNote) -> Vec<Effect> {
    let completed = {
        let Some(sync) = state.active_sync_mut(&job_id) else {
            return Vec::new();
        };
        if sync.is_settled() {
            // A late duplicate `complete` (or any stale note) is a no-op.
            return Vec::new();
        }
        let completed = note.kind == NoteKind::Complete;
        sync.push_note(note);
        if completed {
            sync.settle();
        }
        completed
    };
    state.mark_dirty();
    if completed {
        vec![Effect::StopSync]
    } else {
        Vec::new()
    }
}

fn apply_bucket_override(state: &mut AppState, resume_id: &str, bucket: String) -> Vec<Effect> {
    let overridden = state.sync.as_mut().is_some_and(|sync| {
        match sync
            .rows
            .iter_mut()
            .find(|row| row.id == resume_id && row.analyzed)
        {
            Some(row) => {
                row.bucket = Some(bucket);
                true
            }
            None => false,
        }
    });
    if overridden {
        state.mark_dirty();
    }
    Vec::new()
}
