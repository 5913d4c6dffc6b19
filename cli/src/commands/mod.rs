//! Command implementations

pub mod apply;
pub mod plan;
pub mod show;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::RunDriver;
use crate::domain::{Run, RunStatus};
use crate::infra::{HttpRunService, StdinPrompt};
use crate::output::OutputContext;

/// Wire Ctrl-C to the two-stage shutdown.
///
/// The first interrupt abandons the local wait: watchers unwind with an
/// interrupt signal and the process exits 130 while the remote run keeps
/// going. A second interrupt also tears down prompts and the confirmation
/// watch so the process can exit even mid-prompt.
#[must_use]
pub fn wire_interrupts() -> (CancellationToken, CancellationToken) {
    let stop = CancellationToken::new();
    let cancel = CancellationToken::new();
    let (stop_tx, cancel_tx) = (stop.clone(), cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        cancel_tx.cancel();
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        stop_tx.cancel();
    });
    (stop, cancel)
}

/// Build the run driver over the context's API client, output, and the
/// terminal prompt.
pub(crate) fn driver<'a>(
    ctx: &'a AppContext,
    prompt: &'a StdinPrompt,
) -> RunDriver<'a, HttpRunService, OutputContext, StdinPrompt> {
    RunDriver::new(
        &ctx.api,
        &ctx.output,
        prompt,
        &ctx.config.hostname,
        &ctx.config.organization,
        ctx.input_enabled,
    )
}

/// Translate a terminal run state into the command's exit outcome.
pub(crate) fn report_outcome(run: &Run) -> Result<()> {
    match run.status {
        RunStatus::Errored => bail!("run {} errored; see the run in a browser for details", run.id),
        RunStatus::Canceled => bail!("run {} was canceled", run.id),
        _ => Ok(()),
    }
}
