//! Plan Retrieval — fetch and decode a finished run's plan JSON for
//! display.

use anyhow::{Context, Result, anyhow, bail};

use crate::application::ports::{InputPrompt, OutputSink, RunService};
use crate::application::services::RunDriver;
use crate::domain::{JsonPlan, PlanMode, PlanStatus, RendererOpt, plan_mode_for, run_header};

/// A run's plan prepared for a display layer: the decoded plan, its mode,
/// renderer flags, and a human-readable header.
#[derive(Debug)]
pub struct PlanForDisplay {
    pub plan: JsonPlan,
    pub mode: PlanMode,
    pub renderer_opts: Vec<RendererOpt>,
    pub header: String,
}

impl<S, O, P> RunDriver<'_, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    /// Retrieve the redacted plan JSON for an existing run, for use by
    /// display layers that should not need to know the remote API's
    /// resource types.
    ///
    /// # Errors
    ///
    /// See [`Self::read_plan_for_run`].
    pub async fn read_redacted_plan_for_run(
        &self,
        run_id: &str,
        hostname: &str,
    ) -> Result<PlanForDisplay> {
        self.read_plan_for_run(run_id, hostname, true).await
    }

    /// Retrieve the unredacted plan JSON for an existing run.
    ///
    /// # Errors
    ///
    /// See [`Self::read_plan_for_run`].
    pub async fn read_unredacted_plan_for_run(
        &self,
        run_id: &str,
        hostname: &str,
    ) -> Result<PlanForDisplay> {
        self.read_plan_for_run(run_id, hostname, false).await
    }

    /// Fetch the run with its plan and workspace expanded, validate that
    /// the plan is displayable, and decode its JSON output.
    ///
    /// # Errors
    ///
    /// Fails fast (no remote read) when `hostname` differs from the
    /// configured remote host; fails when the plan is in a state that
    /// cannot be displayed or its JSON cannot be decoded.
    async fn read_plan_for_run(
        &self,
        run_id: &str,
        hostname: &str,
        redacted: bool,
    ) -> Result<PlanForDisplay> {
        if hostname != self.hostname {
            bail!(
                "hostname for run ({hostname}) does not match the configured remote host ({})",
                self.hostname
            );
        }

        let run = self.api.read_run_expanded(run_id).await?;
        let mode = plan_mode_for(&run);

        let plan = run
            .plan
            .as_ref()
            .ok_or_else(|| anyhow!("run {run_id} response did not include its plan"))?;

        let mut renderer_opts = Vec::new();
        match plan.status {
            PlanStatus::Errored => {
                // Errored plans might still be displayable; the renderer
                // needs to know.
                renderer_opts.push(RendererOpt::Errored);
                renderer_opts.push(RendererOpt::CanNotApply);
            }
            PlanStatus::Finished => {
                if !plan.has_changes {
                    renderer_opts.push(RendererOpt::CanNotApply);
                }
            }
            other => bail!("can't display a plan that is currently {}", other.as_str()),
        }

        let bytes = if redacted {
            self.api.read_redacted_plan_json(&plan.id).await?
        } else {
            self.api.read_plan_json(&plan.id).await?
        };
        let json_plan: JsonPlan =
            serde_json::from_slice(&bytes).context("failed to decode plan JSON")?;

        let workspace = run
            .workspace
            .as_ref()
            .ok_or_else(|| anyhow!("run {run_id} response did not include its workspace"))?;
        let header = run_header(self.hostname, self.organization, &workspace.name, &run.id);

        Ok(PlanForDisplay {
            plan: json_plan,
            mode,
            renderer_opts,
            header,
        })
    }
}
