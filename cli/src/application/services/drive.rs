//! Stage sequencer — submits a run and drives it through the lifecycle:
//! watch out of the queue, cost estimation, policy checks, confirmation.

use anyhow::{Context, Result, bail};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InputOpts, InputPrompt, OutputSink, RunService};
use crate::application::services::RunDriver;
use crate::domain::{Operation, Run, RunSignal, RunStatus, run_header, run_url};

impl<S, O, P> RunDriver<'_, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    /// Submit a run for the operation's workspace and drive it to the
    /// point where it has either been declined, failed, or handed over for
    /// execution. Returns the last snapshot of the run.
    ///
    /// # Errors
    ///
    /// Propagates failures from every stage: submission, watching, cost
    /// estimation, policy evaluation, and confirmation.
    pub async fn drive(
        &self,
        stop: &CancellationToken,
        cancel: &CancellationToken,
        operation: &Operation,
    ) -> Result<Run> {
        let workspace = self
            .api
            .read_workspace(self.organization, &operation.workspace)
            .await
            .context("Failed to retrieve workspace")?;

        let run = self
            .api
            .create_run(&workspace.id, operation)
            .await
            .context("Failed to create run")?;

        self.out.line(&run_header(
            self.hostname,
            self.organization,
            &workspace.name,
            &run.id,
        ));
        self.out.line("");

        let run = self
            .wait_for_run(stop, cancel, operation, run, &workspace)
            .await?;

        self.cost_estimate(stop, cancel, operation, &run).await?;
        self.check_policy(stop, cancel, operation, &run).await?;

        if operation.op_type.is_plan_only() {
            return Ok(run);
        }

        // Re-read before deciding: the run may have been resolved while the
        // policy stage streamed logs.
        let run = self
            .api
            .read_run(&run.id)
            .await
            .context("Failed to retrieve run")?;

        if matches!(
            run.status,
            RunStatus::Canceled | RunStatus::Errored | RunStatus::Discarded
        ) {
            return Ok(run);
        }

        if run.actions.is_confirmable {
            self.confirm_and_apply(stop, operation, &run).await?;
        } else if !run.has_changes {
            self.out.line("\nNo changes. Infrastructure is up-to-date.");
        }

        Ok(run)
    }

    /// Ask the operator to approve the pending changes, then confirm the
    /// run for execution. Auto-approve skips the prompt but not the
    /// confirmation call.
    async fn confirm_and_apply(
        &self,
        stop: &CancellationToken,
        operation: &Operation,
        run: &Run,
    ) -> Result<()> {
        if !operation.auto_approve {
            let url = run_url(self.hostname, self.organization, &operation.workspace, &run.id);
            if !self.input_enabled {
                bail!(
                    "The run needs confirmation, but input is disabled. \
                     Approve or discard it in the UI.\n{url}"
                );
            }

            let opts = InputOpts {
                id: "approve",
                query: if operation.op_type.is_destroy() {
                    "\nDo you really want to destroy all resources?"
                } else {
                    "\nDo you want to perform these actions?"
                },
                description: "Only 'yes' will be accepted to approve.",
            };
            match self.confirm(stop, operation, &opts, run, "yes").await {
                Ok(()) => {}
                Err(err) if err.downcast_ref::<RunSignal>() == Some(&RunSignal::RunApproved) => {
                    // Approved in the UI while we were asking; nothing to
                    // confirm locally.
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }

        self.api
            .apply_run(&run.id)
            .await
            .context("Failed to approve the pending changes")
    }
}
