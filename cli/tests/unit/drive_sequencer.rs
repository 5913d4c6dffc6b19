//! Stage sequencer tests — submission through confirmation, end to end
//! against the scripted client.

#![allow(clippy::expect_used)]

use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use strato_cli::domain::{OperationType, RunActions, RunStatus};

use crate::mocks::{self, RecordingSink, ScriptedApi, ScriptedPrompt};

fn planned_confirmable() -> strato_cli::domain::Run {
    let mut run = mocks::run("run-1", RunStatus::Planned);
    run.actions = RunActions {
        is_confirmable: true,
        is_discardable: true,
    };
    run
}

#[tokio::test(start_paused = true)]
async fn test_drive_confirms_an_approved_run() {
    let api = ScriptedApi::with_run_reads(vec![planned_confirmable()]);
    *api.created.lock().expect("poisoned") = Some(mocks::run("run-1", RunStatus::Pending));
    api.workspace_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::workspace("ws-1", "production"));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::answering("yes");
    let driver = mocks::driver(&api, &out, &prompt);

    let run = driver
        .drive(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
        )
        .await
        .expect("the run is driven to confirmation");

    assert_eq!(run.status, RunStatus::Planned);
    assert_eq!(api.applies.load(Ordering::SeqCst), 1);
    assert!(out.contains("To view this run in a browser"));
}

#[tokio::test(start_paused = true)]
async fn test_drive_stops_after_plan_for_plan_only_operations() {
    let api = ScriptedApi::with_run_reads(vec![mocks::run("run-1", RunStatus::Planned)]);
    *api.created.lock().expect("poisoned") = Some(mocks::run("run-1", RunStatus::Pending));
    api.workspace_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::workspace("ws-1", "production"));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let run = driver
        .drive(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Plan),
        )
        .await
        .expect("plan-only runs need no confirmation");

    assert_eq!(run.status, RunStatus::Planned);
    assert_eq!(api.applies.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drive_leaves_externally_discarded_runs_alone() {
    let api = ScriptedApi::with_run_reads(vec![
        mocks::run("run-1", RunStatus::Planned),
        mocks::run("run-1", RunStatus::Discarded),
    ]);
    *api.created.lock().expect("poisoned") = Some(mocks::run("run-1", RunStatus::Pending));
    api.workspace_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::workspace("ws-1", "production"));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let run = driver
        .drive(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
        )
        .await
        .expect("discarded runs end the drive quietly");

    assert_eq!(run.status, RunStatus::Discarded);
    assert_eq!(api.applies.load(Ordering::SeqCst), 0);
    assert_eq!(api.discards.load(Ordering::SeqCst), 0);
}
