//! Run Watcher — polls a run until it leaves the queued state.
//!
//! Every suspension point observes both the stop and cancel tokens; the
//! wait-reason narration is throttled to once per 30 seconds and computed
//! from cheapest to most expensive source: workspace lock, workspace-local
//! queue scan, organization-wide queue position.

use std::time::Instant;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InputPrompt, OutputSink, RunService};
use crate::application::services::{RunDriver, format_elapsed};
use crate::domain::{
    BACKOFF_MAX_MS, BACKOFF_MIN_MS, CancelSignal, Operation, QueueScan, Run, RunStatus, Workspace,
    backoff,
};

impl<S, O, P> RunDriver<'_, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    /// Poll `run` until its status is no longer `Pending` or `Confirmed`,
    /// narrating why it is still waiting. Returns the first non-queued
    /// snapshot of the run.
    ///
    /// # Errors
    ///
    /// Returns `CancelSignal::Stop` / `CancelSignal::Interrupt` when the
    /// corresponding token fires, or a wrapped error when any remote read
    /// fails. Read failures are fatal for this call, never retried here.
    pub async fn wait_for_run(
        &self,
        stop: &CancellationToken,
        cancel: &CancellationToken,
        operation: &Operation,
        mut run: Run,
        workspace: &Workspace,
    ) -> Result<Run> {
        let started = Instant::now();
        let mut updated = started;
        let mut workspace = workspace.clone();
        let mut i: u32 = 0;

        loop {
            tokio::select! {
                () = stop.cancelled() => return Err(CancelSignal::Stop.into()),
                () = cancel.cancelled() => return Err(CancelSignal::Interrupt.into()),
                () = tokio::time::sleep(backoff(BACKOFF_MIN_MS, BACKOFF_MAX_MS, i)) => {}
            }

            run = self
                .api
                .read_run(&run.id)
                .await
                .context("Failed to retrieve run")?;

            // Return once the run is no longer waiting to be picked up.
            if run.status != RunStatus::Pending && run.status != RunStatus::Confirmed {
                if i == 0 && operation.op_type.is_plan_only() {
                    self.out.line(&format!(
                        "Waiting for the {} to start...\n",
                        operation.op_type.label()
                    ));
                }
                if i > 0 {
                    // Separate the queue narration from the stage output.
                    self.out.line("");
                }
                return Ok(run);
            }

            let now = Instant::now();
            if self.out.enabled() && (i == 0 || now.duration_since(updated).as_secs_f64() > 30.0) {
                updated = now;
                let elapsed = if i > 0 {
                    format!(" ({} elapsed)", format_elapsed(now.duration_since(started)))
                } else {
                    String::new()
                };

                workspace = self
                    .api
                    .read_workspace(self.organization, &workspace.name)
                    .await
                    .context("Failed to retrieve workspace")?;

                // A manually locked workspace will never queue the run, so
                // report that without any queue arithmetic.
                if workspace.locked {
                    if let Some(current_ref) = &workspace.current_run {
                        let current = self
                            .api
                            .read_run(&current_ref.id)
                            .await
                            .context("Failed to retrieve current run")?;
                        if current.status == RunStatus::Pending {
                            self.out.line(&format!(
                                "Waiting for the manually locked workspace to be unlocked...{elapsed}"
                            ));
                            i += 1;
                            continue;
                        }
                    }
                }

                let current_run_id = workspace.current_run.as_ref().map(|r| r.id.as_str());

                // Skip the workspace queue scan when we are the current run.
                if current_run_id != Some(run.id.as_str()) {
                    let position = self
                        .local_queue_position(&workspace.id, &run.id, current_run_id, operation)
                        .await?;
                    if position > 0 {
                        self.out.line(&format!(
                            "Waiting for {position} run(s) to finish before being queued...{elapsed}"
                        ));
                        i += 1;
                        continue;
                    }
                }

                if let Some(position) = self.global_queue_position(&run.id).await? {
                    if position > 0 {
                        let capacity = self
                            .api
                            .read_capacity(self.organization)
                            .await
                            .context("Failed to retrieve capacity")?;
                        self.out.line(&format!(
                            "Waiting for {} queued run(s) to finish before starting...{elapsed}",
                            position - capacity.running
                        ));
                        i += 1;
                        continue;
                    }
                }

                self.out.line(&format!(
                    "Waiting for the {} to start...{elapsed}",
                    operation.op_type.label()
                ));
            }

            i += 1;
        }
    }

    /// Walk the workspace's run listing and count the runs that must finish
    /// before the watched run is queued.
    async fn local_queue_position(
        &self,
        workspace_id: &str,
        run_id: &str,
        current_run_id: Option<&str>,
        operation: &Operation,
    ) -> Result<u64> {
        let mut scan = QueueScan::default();
        let mut page_number = 1;
        loop {
            let page = self
                .api
                .list_runs(workspace_id, page_number)
                .await
                .context("Failed to retrieve run list")?;

            let items: Vec<(String, RunStatus)> = page
                .items
                .iter()
                .map(|r| (r.id.clone(), r.status))
                .collect();
            if scan.scan_page(&items, run_id, current_run_id, operation.op_type) {
                break;
            }

            if page.is_last() {
                break;
            }
            page_number = page.next_page;
        }
        Ok(scan.position())
    }

    /// Find the watched run's position in the organization-wide queue, or
    /// `None` when it is not queued there.
    async fn global_queue_position(&self, run_id: &str) -> Result<Option<i64>> {
        let mut page_number = 1;
        loop {
            let page = self
                .api
                .read_run_queue(self.organization, page_number)
                .await
                .context("Failed to retrieve queue")?;

            if let Some(item) = page.items.iter().find(|item| item.id == run_id) {
                return Ok(Some(item.position_in_queue));
            }

            if page.is_last() {
                return Ok(None);
            }
            page_number = page.next_page;
        }
    }
}
