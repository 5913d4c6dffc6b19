//! Policy Check Evaluator tests — log streaming, outcomes, and the
//! override protocol.

#![allow(clippy::expect_used)]

use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use strato_cli::application::RunDriver;
use strato_cli::commands::apply::{ApplyArgs, operation_for};
use strato_cli::domain::{OperationType, PolicyStatus, RunSignal, RunStatus};

use crate::mocks::{self, RecordingSink, ScriptedApi, ScriptedPrompt};

fn run_with_checks(status: RunStatus, check_ids: &[&str]) -> strato_cli::domain::Run {
    let mut run = mocks::run("run-1", status);
    run.policy_checks = check_ids.iter().map(|id| mocks::resource_ref(id)).collect();
    run
}

#[tokio::test(start_paused = true)]
async fn test_passed_check_streams_logs() {
    let api = ScriptedApi::default();
    api.logs
        .lock()
        .expect("poisoned")
        .push_back("2 policies evaluated\n".to_string());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check("pc-1", PolicyStatus::Passed, false, false));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect("passed check succeeds");

    assert!(out.contains("Organization Policy Check:"));
    assert!(out.contains("2 policies evaluated"));
    assert_eq!(api.overrides.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hard_failed_check_is_fatal() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::HardFailed,
            true,
            true,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect_err("hard failures are fatal");

    assert!(err.to_string().contains("hard failed"));
    assert_eq!(api.overrides.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_soft_failure_overridden_under_auto_approve() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::SoftFailed,
            true,
            true,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let mut operation = mocks::operation(OperationType::Apply);
    operation.auto_approve = true;

    driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &operation,
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect("auto-approve overrides the check");

    assert_eq!(api.overrides.load(Ordering::SeqCst), 1);
}

// The apply command must keep the operation interactive under --auto-approve:
// the flag only skips the confirmation prompt, and clearing interactivity
// would make every soft failure ineligible before the auto-override runs.
#[tokio::test(start_paused = true)]
async fn test_apply_auto_approve_flag_keeps_override_eligibility() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::SoftFailed,
            true,
            true,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let args = ApplyArgs {
        workspace: "production".to_string(),
        auto_approve: true,
    };
    let operation = operation_for(&args, OperationType::Apply, true);
    assert!(operation.interactive);

    driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &operation,
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect("auto-approve overrides the soft failure");

    assert_eq!(api.overrides.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ineligible_soft_failure_is_fatal_without_override_call() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    // The token lacks the override permission.
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::SoftFailed,
            true,
            false,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    let err = driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect_err("ineligible soft failure is fatal");

    assert!(err.to_string().contains("soft failed"));
    assert_eq!(api.overrides.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_soft_failure_with_input_disabled_needs_ui_confirmation() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::SoftFailed,
            true,
            true,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = RunDriver::new(
        &api,
        &out,
        &prompt,
        mocks::HOSTNAME,
        mocks::ORGANIZATION,
        false,
    );

    let err = driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect_err("needs UI confirmation");

    assert_eq!(
        err.downcast_ref::<RunSignal>(),
        Some(&RunSignal::PolicyOverrideNeedsUiConfirmation)
    );
    assert_eq!(api.overrides.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_soft_failure_overridden_by_operator_keyword() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::SoftFailed,
            true,
            true,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::answering("override");
    let driver = mocks::driver(&api, &out, &prompt);

    driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &run_with_checks(RunStatus::Planned, &["pc-1"]),
        )
        .await
        .expect("operator override succeeds");

    assert_eq!(api.overrides.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_checks_on_canceled_run_are_skipped() {
    let api = ScriptedApi::default();
    api.logs.lock().expect("poisoned").push_back(String::new());
    api.policy_reads
        .lock()
        .expect("poisoned")
        .push_back(mocks::policy_check(
            "pc-1",
            PolicyStatus::Pending,
            false,
            false,
        ));
    let out = RecordingSink::default();
    let prompt = ScriptedPrompt::silent();
    let driver = mocks::driver(&api, &out, &prompt);

    driver
        .check_policy(
            &CancellationToken::new(),
            &CancellationToken::new(),
            &mocks::operation(OperationType::Apply),
            &run_with_checks(RunStatus::Canceled, &["pc-1"]),
        )
        .await
        .expect("unresolved checks are skipped");

    assert!(!out.contains("Policy Check:"));
}
