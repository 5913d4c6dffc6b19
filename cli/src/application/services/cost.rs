//! Cost Estimate Monitor — polls a run's cost estimate to a terminal state.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InputPrompt, OutputSink, RunService};
use crate::application::services::{DIVIDER, RunDriver, format_elapsed};
use crate::domain::{
    BACKOFF_MAX_MS, BACKOFF_MIN_MS, CancelSignal, CostEstimateStatus, Operation, Run, RunStatus,
    backoff, split_delta,
};

const MSG_PREFIX: &str = "Cost Estimation";

impl<S, O, P> RunDriver<'_, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    /// Wait for the run's cost estimate to conclude and narrate the
    /// outcome. A run without a cost estimate reference is a no-op.
    ///
    /// An errored or targeting-skipped estimate is narrated but does not
    /// fail the operation; a canceled estimate does.
    ///
    /// # Errors
    ///
    /// Returns `CancelSignal` errors on token cancellation, wrapped read
    /// errors, a failure for a canceled estimate, and an unexpected-state
    /// error for statuses this client does not know.
    pub async fn cost_estimate(
        &self,
        stop: &CancellationToken,
        cancel: &CancellationToken,
        operation: &Operation,
        run: &Run,
    ) -> Result<()> {
        let Some(estimate_ref) = &run.cost_estimate else {
            return Ok(());
        };

        let started = Instant::now();
        let mut updated = started;
        let mut i: u32 = 0;

        loop {
            tokio::select! {
                () = stop.cancelled() => return Err(CancelSignal::Stop.into()),
                () = cancel.cancelled() => return Err(CancelSignal::Interrupt.into()),
                () = tokio::time::sleep(backoff(BACKOFF_MIN_MS, BACKOFF_MAX_MS, i)) => {}
            }

            let estimate = self
                .api
                .read_cost_estimate(&estimate_ref.id)
                .await
                .context("Failed to retrieve cost estimate")?;

            // If the run was canceled or errored while the estimate has no
            // result, there is nothing further to render.
            if estimate.status != CostEstimateStatus::Finished
                && matches!(run.status, RunStatus::Canceled | RunStatus::Errored)
            {
                return Ok(());
            }

            if i == 0 {
                self.out.line(&format!("\n{DIVIDER}\n"));
            }

            match estimate.status {
                CostEstimateStatus::Finished => {
                    let (sign, delta) =
                        split_delta(&estimate.delta_monthly_cost).context("Unexpected error")?;

                    self.out.line(&format!("{MSG_PREFIX}:\n"));
                    self.out.line(&format!(
                        "Resources: {} of {} estimated",
                        estimate.matched_resources_count, estimate.resources_count
                    ));
                    self.out.line(&format!(
                        "           ${}/mo {sign}${delta}",
                        estimate.proposed_monthly_cost
                    ));

                    if run.policy_checks.is_empty()
                        && run.has_changes
                        && !operation.op_type.is_plan_only()
                    {
                        self.out.line(&format!("\n{DIVIDER}"));
                    }

                    return Ok(());
                }
                CostEstimateStatus::Pending | CostEstimateStatus::Queued => {
                    let now = Instant::now();
                    if self.out.enabled()
                        && (i == 0 || now.duration_since(updated).as_secs_f64() > 30.0)
                    {
                        updated = now;
                        let elapsed = if i > 0 {
                            format!(" ({} elapsed)", format_elapsed(now.duration_since(started)))
                        } else {
                            String::new()
                        };
                        self.out.line(&format!("{MSG_PREFIX}:\n"));
                        self.out
                            .line(&format!("Waiting for cost estimate to complete...{elapsed}\n"));
                    }
                }
                CostEstimateStatus::SkippedDueToTargeting => {
                    self.out.line(&format!("{MSG_PREFIX}:\n"));
                    self.out.line(
                        "Not available for this plan, because it was created with resource targeting.",
                    );
                    self.out.line(&format!("\n{DIVIDER}"));
                    return Ok(());
                }
                CostEstimateStatus::Errored => {
                    self.out.line(&format!("{MSG_PREFIX} errored.\n"));
                    self.out.line(&format!("\n{DIVIDER}"));
                    return Ok(());
                }
                CostEstimateStatus::Canceled => {
                    bail!("{MSG_PREFIX} canceled.");
                }
                CostEstimateStatus::Unknown => {
                    bail!("Unknown or unexpected cost estimate state");
                }
            }

            i += 1;
        }
    }
}
