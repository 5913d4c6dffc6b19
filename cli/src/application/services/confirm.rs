//! Confirmation Protocol — race operator keyword input against out-of-band
//! run transitions.
//!
//! Two futures race under one `tokio::select!`: a fixed-interval watcher
//! that re-reads the run and detects when the awaited decision has already
//! been made (or foreclosed) externally, and the cancellable operator
//! prompt. Exactly one outcome is delivered; the losing future is dropped
//! before the winner issues any override/discard call, so at most one such
//! call ever results from a single invocation.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InputOpts, InputPrompt, OutputSink, RunService};
use crate::application::services::RunDriver;
use crate::domain::{CancelSignal, Operation, RUN_POLL_INTERVAL, Run, RunSignal, RunStatus};

impl<S, O, P> RunDriver<'_, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    /// Wait for the operator to type `keyword`, unless the run's state
    /// forecloses the decision first.
    ///
    /// # Errors
    ///
    /// - `RunSignal::RunOverridden` / `RunSignal::RunApproved` when the
    ///   decision was already made externally;
    /// - the operation-scoped `ApplyDiscarded` / `DestroyDiscarded` when
    ///   the run was discarded externally, or when the operator typed
    ///   anything other than `keyword` (after discarding the run if it is
    ///   still discardable);
    /// - `CancelSignal::Stop` when the stop token fires while waiting;
    /// - wrapped read/discard errors.
    pub async fn confirm(
        &self,
        stop: &CancellationToken,
        operation: &Operation,
        opts: &InputOpts<'_>,
        run: &Run,
        keyword: &str,
    ) -> Result<()> {
        // Cancelling this token unblocks the prompt; it fires only when the
        // outer stop signal does. The watcher needs no token of its own —
        // losing the select drops it.
        let prompt_cancel = stop.child_token();

        let watcher = self.watch_for_external_decision(stop, operation, run, keyword);
        let input = self.prompt.prompt(&prompt_cancel, opts);

        let typed = tokio::select! {
            err = watcher => return err,
            line = input => {
                line.with_context(|| format!("Error asking {}", opts.id))?
            }
        };

        // The watcher is dropped at this point: the run can no longer be
        // resolved twice from this invocation.
        let Some(typed) = typed else {
            return Err(CancelSignal::Stop.into());
        };

        if typed != keyword {
            let current = self
                .api
                .read_run(&run.id)
                .await
                .context("Failed to retrieve run")?;

            if current.actions.is_discardable {
                self.api.discard_run(&run.id).await.context(
                    if operation.op_type.is_destroy() {
                        "Failed to discard destroy"
                    } else {
                        "Failed to discard apply"
                    },
                )?;
            }

            // Even when the discard succeeds, the operation itself was
            // declined.
            return Err(RunSignal::discarded_for(operation.op_type.is_destroy()).into());
        }

        Ok(())
    }

    /// Re-read the run every poll interval and resolve once the awaited
    /// decision has been made without local input. Never resolves `Ok`.
    async fn watch_for_external_decision(
        &self,
        stop: &CancellationToken,
        operation: &Operation,
        run: &Run,
        keyword: &str,
    ) -> Result<()> {
        loop {
            tokio::select! {
                () = stop.cancelled() => return Err(CancelSignal::Stop.into()),
                () = tokio::time::sleep(RUN_POLL_INTERVAL) => {}
            }

            let current = self
                .api
                .read_run(&run.id)
                .await
                .context("Failed to retrieve run")?;

            let foreclosed = match keyword {
                "override" => {
                    if matches!(
                        current.status,
                        RunStatus::PolicyOverride | RunStatus::PostPlanAwaitingDecision
                    ) {
                        None
                    } else if current.status == RunStatus::Discarded {
                        Some(RunSignal::RunDiscarded)
                    } else {
                        Some(RunSignal::RunOverridden)
                    }
                }
                "yes" => {
                    if current.actions.is_confirmable {
                        None
                    } else if current.status == RunStatus::Discarded {
                        Some(RunSignal::RunDiscarded)
                    } else {
                        Some(RunSignal::RunApproved)
                    }
                }
                _ => None,
            };

            if let Some(signal) = foreclosed {
                self.out.notice(&signal.to_string());

                let signal = if signal == RunSignal::RunDiscarded {
                    RunSignal::discarded_for(operation.op_type.is_destroy())
                } else {
                    signal
                };
                return Err(signal.into());
            }
        }
    }
}
