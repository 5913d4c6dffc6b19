//! Local description of one requested remote operation.

/// What the operator asked the remote service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Plan,
    Apply,
    Destroy,
}

impl OperationType {
    /// Lowercase label used in narration ("Waiting for the plan to start").
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::Destroy => "destroy",
        }
    }

    /// Plan-only operations never confirm, override, or apply anything.
    #[must_use]
    pub fn is_plan_only(self) -> bool {
        self == Self::Plan
    }

    /// Whether this operation destroys managed infrastructure. Discard
    /// errors are phrased differently for destroys.
    #[must_use]
    pub fn is_destroy(self) -> bool {
        self == Self::Destroy
    }
}

/// One requested action against a workspace, alive for the duration of a
/// single run.
#[derive(Debug, Clone)]
pub struct Operation {
    pub op_type: OperationType,
    /// Skip all interactive confirmation, including policy overrides.
    pub auto_approve: bool,
    /// Whether an operator is available to answer prompts. When `false`,
    /// soft-failed policy checks cannot be overridden from this client.
    pub interactive: bool,
    /// Name of the target workspace.
    pub workspace: String,
}
