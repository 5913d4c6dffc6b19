//! Show command — renders the plan of an existing run.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::OutputSink as _;
use crate::domain::{PlanMode, RendererOpt, change_summary};
use crate::infra::StdinPrompt;

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Identifier of the run whose plan to display
    pub run_id: String,

    /// Fetch the unredacted plan instead of the redacted one
    #[arg(long)]
    pub unredacted: bool,
}

/// Run the show command.
///
/// # Errors
///
/// Returns an error when the run cannot be read or its plan is in a state
/// that cannot be displayed.
pub async fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let prompt = StdinPrompt;
    let driver = super::driver(ctx, &prompt);

    let display = if args.unredacted {
        driver
            .read_unredacted_plan_for_run(&args.run_id, &ctx.config.hostname)
            .await?
    } else {
        driver
            .read_redacted_plan_for_run(&args.run_id, &ctx.config.hostname)
            .await?
    };

    ctx.output.line(&display.header);
    ctx.output.line("");
    if display.renderer_opts.contains(&RendererOpt::Errored) {
        ctx.output.warn("The plan errored; the output below may be incomplete.");
    }
    if display.mode == PlanMode::Destroy {
        ctx.output
            .warn("This plan was produced in destroy mode: all resources will be destroyed.");
    }

    for rc in &display.plan.resource_changes {
        ctx.output
            .line(&format!("  {} [{}]", rc.address, rc.change.actions.join(", ")));
    }
    let (add, change, destroy) = change_summary(&display.plan);
    ctx.output.line("");
    ctx.output.line(&format!(
        "Plan: {add} to add, {change} to change, {destroy} to destroy."
    ));
    Ok(())
}
