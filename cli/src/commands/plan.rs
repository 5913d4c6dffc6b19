//! Plan command — submits a speculative run and renders the resulting plan.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::PlanForDisplay;
use crate::application::ports::OutputSink as _;
use crate::domain::{Operation, OperationType, PlanMode, RendererOpt, change_summary};
use crate::infra::StdinPrompt;

/// Arguments for the plan command.
#[derive(Args)]
pub struct PlanArgs {
    /// Workspace to plan against
    #[arg(short, long)]
    pub workspace: String,
}

/// Run the plan command.
///
/// # Errors
///
/// Returns an error when the run cannot be submitted, errors remotely, or
/// is canceled before a plan is produced.
pub async fn run(ctx: &AppContext, args: &PlanArgs) -> Result<()> {
    let (stop, cancel) = super::wire_interrupts();
    let prompt = StdinPrompt;
    let driver = super::driver(ctx, &prompt);

    let operation = Operation {
        op_type: OperationType::Plan,
        auto_approve: false,
        interactive: ctx.input_enabled,
        workspace: args.workspace.clone(),
    };

    let run = driver.drive(&stop, &cancel, &operation).await?;
    super::report_outcome(&run)?;

    if run.plan.is_some() {
        match driver
            .read_redacted_plan_for_run(&run.id, &ctx.config.hostname)
            .await
        {
            Ok(display) => render_summary(ctx, &display),
            Err(err) => ctx.output.warn(&format!("cannot display the plan: {err:#}")),
        }
    }
    Ok(())
}

fn render_summary(ctx: &AppContext, display: &PlanForDisplay) {
    ctx.output.line("");
    if display.renderer_opts.contains(&RendererOpt::Errored) {
        ctx.output.warn("The plan errored; the output below may be incomplete.");
    }
    if display.mode == PlanMode::Destroy {
        ctx.output
            .warn("This plan was produced in destroy mode: all resources will be destroyed.");
    }
    let (add, change, destroy) = change_summary(&display.plan);
    ctx.output.line(&format!(
        "Plan: {add} to add, {change} to change, {destroy} to destroy."
    ));
}
