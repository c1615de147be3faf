use std::path::PathBuf;

use screener_core::{
    update, AppState, DraftBatch, Effect, FileMeta, Msg, SelectedFile, Severity,
};

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn picked(name: &str) -> SelectedFile {
    SelectedFile {
        meta: FileMeta {
            name: name.to_string(),
            size: 64,
            kind: "pdf".to_string(),
            modified_ms: 1_700_000_000_000,
        },
        path: Some(PathBuf::from(format!("/tmp/{name}"))),
    }
}

fn saved_draft(effects: &[Effect]) -> DraftBatch {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SaveDraft(batch) => Some(batch.clone()),
            _ => None,
        })
        .expect("save effect")
}

#[test]
fn a_draft_survives_warm_navigation_as_metadata_only() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::JdFilesChosen(vec![picked("role.pdf")]),
    );
    let (_state, effects) = update(
        state,
        Msg::ResumeFilesChosen(vec![picked("a.pdf"), picked("b.pdf")]),
    );
    let batch = saved_draft(&effects);

    let (restored, effects) = update(AppState::new(), Msg::DraftRestored(batch));
    assert!(effects.is_empty());

    let view = restored.view();
    assert_eq!(view.draft.jd_files[0].name, "role.pdf");
    assert_eq!(view.draft.resumes.len(), 2);
    // Metadata came back, the file handles did not.
    assert!(view.draft.awaiting_files);
    assert!(!view.draft.submit_enabled);
}

#[test]
fn a_restored_draft_blocks_submission_until_files_are_reselected() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ResumeFilesChosen(vec![picked("a.pdf")]),
    );
    let batch = saved_draft(&effects);
    drop(state);

    let (state, _) = update(AppState::new(), Msg::DraftRestored(batch));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(
        state.view().banner.expect("blocked").severity,
        Severity::Error
    );

    // Fresh selections attach live handles again.
    let (state, _) = update(state, Msg::JdFilesChosen(vec![picked("role.pdf")]));
    let (state, _) = update(state, Msg::ResumeFilesChosen(vec![picked("a.pdf")]));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(matches!(effects[0], Effect::SubmitBatch(_)));
    assert!(state.view().submitting);
}

#[test]
fn restore_is_ignored_once_the_user_touched_the_form() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ResumeFilesChosen(vec![picked("old.pdf")]),
    );
    let batch = saved_draft(&effects);

    let (state, _) = update(state, Msg::ResumeFilesChosen(vec![picked("new.pdf")]));
    let (state, _) = update(state, Msg::DraftRestored(batch));

    let view = state.view();
    assert_eq!(view.draft.resumes.len(), 1);
    assert_eq!(view.draft.resumes[0].name, "new.pdf");
    assert!(!view.draft.awaiting_files);
}

#[test]
fn clearing_the_draft_drops_the_persisted_slot() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::ResumeFilesChosen(vec![picked("a.pdf")]),
    );
    let (state, effects) = update(state, Msg::ClearDraftClicked);

    assert_eq!(effects, vec![Effect::ClearDraft]);
    let view = state.view();
    assert!(view.draft.resumes.is_empty());
    assert!(view.draft.jd_files.is_empty());
}

#[test]
fn emptying_every_selection_clears_instead_of_saving() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::ResumeFilesChosen(vec![picked("a.pdf")]),
    );
    let (_state, effects) = update(state, Msg::ResumeFilesChosen(Vec::new()));

    assert_eq!(effects, vec![Effect::ClearDraft]);
}
