//! Plan resource types, decoded plan JSON, and display derivations.

use serde::Deserialize;

use crate::domain::run::Run;

// ── Plan resource ─────────────────────────────────────────────────────────────

/// Lifecycle status of a run's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Queued,
    Running,
    Errored,
    Canceled,
    Finished,
    Unreachable,
    #[serde(other)]
    Unknown,
}

impl PlanStatus {
    /// Wire-format name, used when reporting a plan that cannot be shown.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Errored => "errored",
            Self::Canceled => "canceled",
            Self::Finished => "finished",
            Self::Unreachable => "unreachable",
            Self::Unknown => "unknown",
        }
    }
}

/// The plan attached to a run, as returned when the run is read with the
/// plan expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Plan {
    pub id: String,
    pub status: PlanStatus,
    #[serde(default)]
    pub has_changes: bool,
}

// ── Display derivations ───────────────────────────────────────────────────────

/// How the run was requested to treat existing infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    #[default]
    Normal,
    Destroy,
    RefreshOnly,
}

/// Flags a plan renderer needs to know about beyond the plan data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererOpt {
    /// The plan errored; it may still be displayable.
    Errored,
    /// The plan cannot be applied (errored, or finished with no changes).
    CanNotApply,
}

/// Derive the plan mode from the run's destroy/refresh-only flags.
#[must_use]
pub fn plan_mode_for(run: &Run) -> PlanMode {
    if run.is_destroy {
        PlanMode::Destroy
    } else if run.refresh_only {
        PlanMode::RefreshOnly
    } else {
        PlanMode::Normal
    }
}

/// Browser URL for a run.
#[must_use]
pub fn run_url(hostname: &str, organization: &str, workspace: &str, run_id: &str) -> String {
    format!("https://{hostname}/app/{organization}/{workspace}/runs/{run_id}")
}

/// Human-readable header pointing the operator at the run in a browser.
#[must_use]
pub fn run_header(hostname: &str, organization: &str, workspace: &str, run_id: &str) -> String {
    format!(
        "To view this run in a browser, visit:\n{}",
        run_url(hostname, organization, workspace, run_id)
    )
}

// ── Decoded plan JSON ─────────────────────────────────────────────────────────

/// The structured representation decoded from a run's plan JSON output
/// (redacted or not).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonPlan {
    pub format_version: String,
    pub resource_changes: Vec<ResourceChange>,
    pub output_changes: serde_json::Map<String, serde_json::Value>,
    pub errored: bool,
}

/// One resource-level change in a decoded plan.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceChange {
    pub address: String,
    pub change: Change,
}

/// The action set proposed for a single resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Change {
    pub actions: Vec<String>,
}

/// Totals of resources to add, change, and destroy in a decoded plan.
#[must_use]
pub fn change_summary(plan: &JsonPlan) -> (u64, u64, u64) {
    let (mut add, mut change, mut destroy) = (0, 0, 0);
    for rc in &plan.resource_changes {
        for action in &rc.change.actions {
            match action.as_str() {
                "create" => add += 1,
                "update" => change += 1,
                "delete" => destroy += 1,
                _ => {}
            }
        }
    }
    (add, change, destroy)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
