//! Confirmation protocol tests — the race between operator input and an
//! external decision.

#![allow(clippy::expect_used)]

use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use strato_cli::application::ports::InputOpts;
use strato_cli::domain::{CancelSignal, OperationType, RunActions, RunSignal, RunStatus};

use crate::mocks::{self, RecordingSink, ScriptedApi, ScriptedPrompt};

fn approve_opts() -> InputOpts<'static> {
    InputOpts {
        id: "approve",
        query: "Do you want to perform these actions?",
        description: "Only 'yes' will be accepted to approve.",
    }
}

fn confirmable_run() -> strato_cli::domain::Run {
    let mut run = mocks::run("run-1", RunStatus::Planned);
    run.actions = RunActions {
        is_confirmable: true,
        is_discardable: true,
    };
    run
}

#[tokio::test(start_paused = true)]
async fn test_matching_keyword_confirms() {
    let api = ScriptedApi::default();
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::answering("yes");
    let driver = mocks::driver(&api, &out, &prompt);

    driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect("matching keyword confirms");

    assert_eq!(api.discards.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_mismatched_answer_discards_once() {
    let api = ScriptedApi::with_run_reads(vec![confirmable_run()]);
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::answering("no");
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect_err("mismatch declines the run");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::ApplyDiscarded)
    );
    assert_eq!(api.discards.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_mismatch_on_destroy_reports_destroy_discarded() {
    let api = ScriptedApi::with_run_reads(vec![confirmable_run()]);
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::answering("no");
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Destroy),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect_err("mismatch declines the run");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::DestroyDiscarded)
    );
}

#[tokio::test(start_paused = true)]
async fn test_mismatch_skips_discard_when_run_no_longer_discardable() {
    // The re-read shows the run can no longer be discarded.
    let api = ScriptedApi::with_run_reads(vec![mocks::run("run-1", RunStatus::Planned)]);
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::answering("no");
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect_err("mismatch declines the run");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::ApplyDiscarded)
    );
    assert_eq!(api.discards.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_external_approval_forecloses_the_prompt() {
    // The polled snapshot is no longer confirmable and not discarded, so
    // someone approved it elsewhere while the prompt hung.
    let api = ScriptedApi::with_run_reads(vec![mocks::run("run-1", RunStatus::Confirmed)]);
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect_err("external decision forecloses the prompt");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::RunApproved)
    );
    assert!(out.contains("approved using the UI or API"));
}

#[tokio::test(start_paused = true)]
async fn test_external_discard_maps_to_operation_discarded() {
    let api = ScriptedApi::with_run_reads(vec![mocks::run("run-1", RunStatus::Discarded)]);
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect_err("external discard declines the run");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::ApplyDiscarded)
    );
}

#[tokio::test(start_paused = true)]
async fn test_external_override_forecloses_override_prompt() {
    // Keyword "override", but the run already left the override-pending
    // states.
    let api = ScriptedApi::with_run_reads(vec![mocks::run("run-1", RunStatus::Confirmed)]);
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .confirm(
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &mocks::run("run-1", RunStatus::PolicyOverride),
            "override",
        )
        .await
        .expect_err("external decision forecloses the prompt");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::RunOverridden)
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_token_resolves_to_stop_signal() {
    let api = ScriptedApi::default();
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let stop = CancellationToken::new();
    stop.cancel();

    let err = driver
        .confirm(
            &stop,
            &mocks::operation(OperationType::Apply),
            &approve_opts(),
            &confirmable_run(),
            "yes",
        )
        .await
        .expect_err("stop aborts the prompt");

    assert_eq!(
        err.downcast_ref::<CancelSignal>(),
        Some(&CancelSignal::Stop)
    );
}
