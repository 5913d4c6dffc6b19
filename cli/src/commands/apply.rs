//! Apply and destroy commands — submit a run and drive it through
//! confirmation.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::domain::{Operation, OperationType, RunStatus, run_url};
use crate::infra::StdinPrompt;

/// Arguments shared by the apply and destroy commands.
#[derive(Args)]
pub struct ApplyArgs {
    /// Workspace to run against
    #[arg(short, long)]
    pub workspace: String,

    /// Confirm the run without asking, including soft-failed policy
    /// overrides
    #[arg(long)]
    pub auto_approve: bool,
}

/// Build the operation for one apply or destroy invocation.
///
/// `interactive` reflects only whether an operator is reachable;
/// auto-approve must not clear it, or the policy evaluator would treat an
/// auto-approved run as having nobody who may override a soft failure.
#[must_use]
pub fn operation_for(args: &ApplyArgs, op_type: OperationType, input_enabled: bool) -> Operation {
    Operation {
        op_type,
        auto_approve: args.auto_approve,
        interactive: input_enabled,
        workspace: args.workspace.clone(),
    }
}

/// Run the apply or destroy command.
///
/// # Errors
///
/// Returns an error when the run fails at any lifecycle stage or the
/// operator declines it.
pub async fn run(ctx: &AppContext, args: &ApplyArgs, op_type: OperationType) -> Result<()> {
    let (stop, cancel) = super::wire_interrupts();
    let prompt = StdinPrompt;
    let driver = super::driver(ctx, &prompt);

    let operation = operation_for(args, op_type, ctx.input_enabled);

    let run = driver.drive(&stop, &cancel, &operation).await?;
    super::report_outcome(&run)?;

    match run.status {
        RunStatus::Discarded => ctx.output.warn("The run was discarded."),
        _ if !run.has_changes => {}
        _ => ctx.output.success(&format!(
            "The run has been confirmed; follow execution at {}",
            run_url(
                &ctx.config.hostname,
                &ctx.config.organization,
                &args.workspace,
                &run.id,
            )
        )),
    }
    Ok(())
}
