//! Policy Check Evaluator — streams each check's log and resolves its
//! outcome, driving the override protocol on soft failures.

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InputOpts, InputPrompt, OutputSink, RunService};
use crate::application::services::{DIVIDER, RunDriver};
use crate::domain::{
    Operation, PolicyCheck, PolicyStatus, Run, RunSignal, RunStatus, override_eligible, run_url,
};

impl<S, O, P> RunDriver<'_, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    /// Evaluate the run's policy checks strictly in list order.
    ///
    /// Each check's log is streamed to completion before its status is
    /// acted on. Checks that never produced a result on a canceled or
    /// errored run are skipped.
    ///
    /// # Errors
    ///
    /// Fatal for errored or hard-failed checks, for soft failures that
    /// cannot be overridden from this client, for failed override calls,
    /// and for unknown check states.
    pub async fn check_policy(
        &self,
        stop: &CancellationToken,
        _cancel: &CancellationToken,
        operation: &Operation,
        run: &Run,
    ) -> Result<()> {
        self.out.line(&format!("\n{DIVIDER}\n"));

        let last = run.policy_checks.len().saturating_sub(1);
        for (i, check_ref) in run.policy_checks.iter().enumerate() {
            // This call blocks until the check has produced output or
            // concluded.
            let logs = self
                .api
                .policy_check_logs(&check_ref.id)
                .await
                .context("Failed to retrieve policy check logs")?;

            let check = self
                .api
                .read_policy_check(&check_ref.id)
                .await
                .context("Failed to retrieve policy check")?;

            // A canceled or errored run can leave checks without a result;
            // there is nothing to render for those.
            if matches!(run.status, RunStatus::Canceled | RunStatus::Errored)
                && check.status.is_unresolved()
            {
                continue;
            }

            let msg_prefix = check.scope.label();
            self.out.line(&format!("{msg_prefix}:\n"));

            if self.out.enabled() {
                let mut lines = logs.lines();
                while let Some(line) = lines
                    .next_line()
                    .await
                    .context("Failed to read logs")?
                {
                    self.out.line(&line);
                }
            }

            match check.status {
                PolicyStatus::Passed => {
                    if (run.has_changes && !operation.op_type.is_plan_only()) || i < last {
                        self.out.line(&format!("\n{DIVIDER}"));
                    }
                }
                PolicyStatus::Errored => bail!("{msg_prefix} errored."),
                PolicyStatus::HardFailed => bail!("{msg_prefix} hard failed."),
                PolicyStatus::SoftFailed => {
                    self.resolve_soft_failure(stop, operation, run, &check, &msg_prefix)
                        .await?;
                    self.out.line(DIVIDER);
                }
                _ => bail!("Unknown or unexpected policy state"),
            }
        }

        Ok(())
    }

    /// Resolve a soft-failed check: override it directly under
    /// auto-approve, refuse when input is unavailable, or put the decision
    /// to the operator through the confirmation protocol.
    async fn resolve_soft_failure(
        &self,
        stop: &CancellationToken,
        operation: &Operation,
        run: &Run,
        check: &PolicyCheck,
        msg_prefix: &str,
    ) -> Result<()> {
        let url = run_url(self.hostname, self.organization, &operation.workspace, &run.id);

        if !override_eligible(check, operation) {
            bail!("{msg_prefix} soft failed.\n{url}");
        }

        if operation.auto_approve {
            return self
                .api
                .override_policy_check(&check.id)
                .await
                .with_context(|| format!("Failed to override policy check.\n{url}"));
        }

        if !self.input_enabled {
            return Err(RunSignal::PolicyOverrideNeedsUiConfirmation.into());
        }

        let opts = InputOpts {
            id: "override",
            query: "\nDo you want to override the soft failed policy check?",
            description: "Only 'override' will be accepted to override.",
        };

        match self.confirm(stop, operation, &opts, run, "override").await {
            Ok(()) => self
                .api
                .override_policy_check(&check.id)
                .await
                .with_context(|| format!("Failed to override policy check.\n{url}")),
            Err(err) if err.downcast_ref::<RunSignal>() == Some(&RunSignal::RunOverridden) => {
                // Someone resolved it in the UI while we were asking; no
                // local override call must follow.
                self.out.line(&format!(
                    "The run needs to be manually overridden or discarded.\n{url}\n"
                ));
                Ok(())
            }
            Err(err) => Err(anyhow!("Failed to override: {err}\n{url}\n")),
        }
    }
}
