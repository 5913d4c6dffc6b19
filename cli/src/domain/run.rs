//! Run and workspace resource types, plus the pure workspace-queue scan.
//!
//! These mirror the remote service's wire representation (kebab-case
//! attribute names, snake_case status values). The client never mutates
//! them; every decision re-reads the resource first because runs transition
//! out-of-band on the server.

use serde::Deserialize;

use crate::domain::operation::OperationType;

// ── Resource types ────────────────────────────────────────────────────────────

/// Reference to another resource by id, as embedded in relationship fields.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResourceRef {
    pub id: String,
}

/// Lifecycle status of a run on the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Confirmed,
    PolicyOverride,
    PostPlanAwaitingDecision,
    Planned,
    Applied,
    Discarded,
    Canceled,
    Errored,
    /// Forward-compatibility guard for statuses this client does not know.
    #[serde(other)]
    Unknown,
}

/// Actions the remote service currently permits on a run.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RunActions {
    pub is_confirmable: bool,
    pub is_discardable: bool,
}

/// One requested infrastructure-change execution tracked by the remote
/// service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub is_destroy: bool,
    #[serde(default)]
    pub refresh_only: bool,
    #[serde(default)]
    pub actions: RunActions,
    #[serde(default)]
    pub cost_estimate: Option<ResourceRef>,
    #[serde(default)]
    pub policy_checks: Vec<ResourceRef>,
    /// Populated only when the run is read with the plan expanded.
    #[serde(default)]
    pub plan: Option<crate::domain::plan::Plan>,
    /// Populated only when the run is read with the workspace expanded.
    #[serde(default)]
    pub workspace: Option<Workspace>,
}

/// A named execution context owning a current-run pointer and a lock flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub current_run: Option<ResourceRef>,
}

/// One page of a paginated list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub next_page: u32,
}

impl<T> Page<T> {
    /// Whether this is the last page of the listing.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// An entry in the organization-wide run queue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueuedRun {
    pub id: String,
    pub position_in_queue: i64,
}

/// Organization execution capacity.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Capacity {
    pub pending: i64,
    pub running: i64,
}

// ── Workspace queue scan ──────────────────────────────────────────────────────

/// Incremental scan over a workspace's run listing (most recent first),
/// counting how many runs must finish before the watched run is queued.
///
/// Feed pages in order via [`QueueScan::scan_page`]; the scan is done when
/// that returns `true` (the workspace's current run was reached) or the
/// pages run out. One scan instance is good for one listing walk.
#[derive(Debug, Default)]
pub struct QueueScan {
    found: bool,
    position: u64,
}

impl QueueScan {
    /// Number of blocking runs counted so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Scan one page of runs. Runs before the watched run are skipped;
    /// after it, every run strictly between the watched run and the
    /// workspace's current run counts toward the queue position unless it
    /// is in a terminal state, or already planned when the operation is a
    /// plan (concurrent plans never block each other). Returns `true` once
    /// the workspace's current run is reached.
    pub fn scan_page(
        &mut self,
        items: &[(String, RunStatus)],
        watched_id: &str,
        current_run_id: Option<&str>,
        op_type: OperationType,
    ) -> bool {
        for (id, status) in items {
            if !self.found {
                if id == watched_id {
                    self.found = true;
                }
                continue;
            }

            if current_run_id == Some(id.as_str()) {
                return true;
            }

            match status {
                RunStatus::Applied
                | RunStatus::Canceled
                | RunStatus::Discarded
                | RunStatus::Errored => continue,
                RunStatus::Planned if op_type == OperationType::Plan => continue,
                _ => {}
            }

            self.position += 1;
        }
        false
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
