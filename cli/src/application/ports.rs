//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    Capacity, CostEstimate, Operation, Page, PolicyCheck, QueuedRun, Run, Workspace,
};

// ── Value Types ───────────────────────────────────────────────────────────────

/// A blocking, line-oriented log stream for a policy check. The remote side
/// holds the connection open until the check has produced output or
/// concluded.
pub type LogStream = Box<dyn AsyncBufRead + Send + Unpin>;

/// Prompt parameters for a single line of operator input.
pub struct InputOpts<'a> {
    /// Stable identifier for the prompt, e.g. `"override"` or `"approve"`.
    pub id: &'a str,
    /// The question shown to the operator.
    pub query: &'a str,
    /// Explanation of which answers are accepted.
    pub description: &'a str,
}

// ── Remote Run Service ports ──────────────────────────────────────────────────

/// Run read/list/write operations against the remote service.
#[allow(async_fn_in_trait)]
pub trait RunClient {
    /// Read a run by id.
    async fn read_run(&self, id: &str) -> Result<Run>;
    /// Read a run by id with its plan and workspace expanded.
    async fn read_run_expanded(&self, id: &str) -> Result<Run>;
    /// List one page of a workspace's runs, most recent first.
    async fn list_runs(&self, workspace_id: &str, page: u32) -> Result<Page<Run>>;
    /// Submit a new run for the workspace.
    async fn create_run(&self, workspace_id: &str, operation: &Operation) -> Result<Run>;
    /// Confirm a run's pending changes for execution.
    async fn apply_run(&self, id: &str) -> Result<()>;
    /// Discard a run.
    async fn discard_run(&self, id: &str) -> Result<()>;
}

/// Workspace read operations.
#[allow(async_fn_in_trait)]
pub trait WorkspaceClient {
    /// Read a workspace by organization and name.
    async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace>;
}

/// Cost estimate read operations.
#[allow(async_fn_in_trait)]
pub trait CostEstimateClient {
    /// Read a cost estimate by id.
    async fn read_cost_estimate(&self, id: &str) -> Result<CostEstimate>;
}

/// Policy check read/override operations, including the blocking log
/// stream.
#[allow(async_fn_in_trait)]
pub trait PolicyClient {
    /// Read a policy check by id.
    async fn read_policy_check(&self, id: &str) -> Result<PolicyCheck>;
    /// Open the check's log stream. This call does not return until the
    /// remote side has produced output or the check has concluded.
    async fn policy_check_logs(&self, id: &str) -> Result<LogStream>;
    /// Override a soft-failed policy check.
    async fn override_policy_check(&self, id: &str) -> Result<()>;
}

/// Organization-wide queue and capacity reads.
#[allow(async_fn_in_trait)]
pub trait OrganizationClient {
    /// List one page of the organization's run queue.
    async fn read_run_queue(&self, organization: &str, page: u32) -> Result<Page<QueuedRun>>;
    /// Read the organization's execution capacity.
    async fn read_capacity(&self, organization: &str) -> Result<Capacity>;
}

/// Plan JSON output reads.
#[allow(async_fn_in_trait)]
pub trait PlanClient {
    /// Read the plain plan JSON for a plan id.
    async fn read_plan_json(&self, plan_id: &str) -> Result<Vec<u8>>;
    /// Read the redacted plan JSON for a plan id (authenticated, retried
    /// with bounded attempts and bounded wait).
    async fn read_redacted_plan_json(&self, plan_id: &str) -> Result<Vec<u8>>;
}

/// Composite trait — any type implementing all six sub-traits is a
/// `RunService`.
pub trait RunService:
    RunClient + WorkspaceClient + CostEstimateClient + PolicyClient + OrganizationClient + PlanClient
{
}

/// Blanket implementation: any type implementing all six sub-traits is a
/// `RunService`.
impl<T> RunService for T where
    T: RunClient
        + WorkspaceClient
        + CostEstimateClient
        + PolicyClient
        + OrganizationClient
        + PlanClient
{
}

// ── Output Sink Port ──────────────────────────────────────────────────────────

/// Line-oriented narration sink. Absent narration (a disabled sink) never
/// affects control flow, but a disabled sink also means the watcher skips
/// the status computations that exist only to narrate. Sync trait — no
/// async needed.
pub trait OutputSink {
    /// Whether narration is being rendered at all.
    fn enabled(&self) -> bool {
        true
    }
    /// Emit one line of progress narration.
    fn line(&self, message: &str);
    /// Emit an out-of-band state-change notice (styled where supported).
    fn notice(&self, message: &str) {
        self.line(message);
    }
}

// ── Input Prompt Port ─────────────────────────────────────────────────────────

/// A single-line operator prompt that can be cancelled from outside while
/// it waits.
#[allow(async_fn_in_trait)]
pub trait InputPrompt {
    /// Ask the operator for one line of input. Returns `Ok(None)` when the
    /// prompt was cancelled via `cancel` before a line arrived.
    async fn prompt(
        &self,
        cancel: &CancellationToken,
        opts: &InputOpts<'_>,
    ) -> Result<Option<String>>;
}
