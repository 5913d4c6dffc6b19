//! Policy check resource types and the override eligibility rule.

use serde::Deserialize;

use crate::domain::operation::Operation;

/// Where a policy set is attached. Unrecognized scopes keep the raw wire
/// value so narration can still name them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PolicyScope {
    Organization,
    Workspace,
    Unknown(String),
}

impl From<String> for PolicyScope {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "organization" => Self::Organization,
            "workspace" => Self::Workspace,
            _ => Self::Unknown(raw),
        }
    }
}

impl PolicyScope {
    /// Narration prefix, e.g. "Organization Policy Check".
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Organization => "Organization Policy Check".to_string(),
            Self::Workspace => "Workspace Policy Check".to_string(),
            Self::Unknown(raw) => format!("Unknown policy check ({raw})"),
        }
    }
}

/// Lifecycle status of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Pending,
    Queued,
    Unreachable,
    Passed,
    SoftFailed,
    HardFailed,
    Errored,
    #[serde(other)]
    Unknown,
}

impl PolicyStatus {
    /// Whether the check has not produced a result yet. Non-terminal checks
    /// are skipped when their run was canceled or errored out-of-band.
    #[must_use]
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Pending | Self::Queued | Self::Unreachable)
    }
}

/// Actions the remote service currently permits on a policy check.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyActions {
    pub is_overridable: bool,
}

/// Permissions the current token holds on a policy check.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyPermissions {
    pub can_override: bool,
}

/// An automated compliance evaluation attached to a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyCheck {
    pub id: String,
    pub scope: PolicyScope,
    pub status: PolicyStatus,
    #[serde(default)]
    pub actions: PolicyActions,
    #[serde(default)]
    pub permissions: PolicyPermissions,
}

/// Whether a soft-failed check may be overridden from this client: the
/// operation must not be plan-only, an operator must be reachable through
/// the interactive sinks, and both the action flag and the token permission
/// must allow it.
#[must_use]
pub fn override_eligible(check: &PolicyCheck, op: &Operation) -> bool {
    !op.op_type.is_plan_only()
        && op.interactive
        && check.actions.is_overridable
        && check.permissions.can_override
}

// ── Unit tests ────────────────────────────────────────────────────────────────
