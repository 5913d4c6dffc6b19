//! Cost estimate resource types and the signed-delta rendering split.

use serde::Deserialize;

/// Lifecycle status of a cost estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostEstimateStatus {
    Queued,
    Pending,
    Finished,
    Errored,
    Canceled,
    SkippedDueToTargeting,
    #[serde(other)]
    Unknown,
}

/// A computed monthly-cost delta for a run's proposed changes. Immutable
/// once `Finished`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CostEstimate {
    pub id: String,
    pub status: CostEstimateStatus,
    #[serde(default)]
    pub proposed_monthly_cost: String,
    #[serde(default)]
    pub delta_monthly_cost: String,
    #[serde(default)]
    pub matched_resources_count: u64,
    #[serde(default)]
    pub resources_count: u64,
}

/// Split a decimal monthly-cost delta into its display sign and unsigned
/// magnitude, e.g. `"-12.50"` becomes `('-', "12.50")`.
///
/// # Errors
///
/// Returns an error when the delta is not a parseable decimal.
pub fn split_delta(delta: &str) -> anyhow::Result<(char, String)> {
    let value: f64 = delta
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid monthly cost delta {delta:?}: {e}"))?;
    let sign = if value < 0.0 { '-' } else { '+' };
    Ok((sign, delta.replacen('-', "", 1)))
}

// ── Unit tests ────────────────────────────────────────────────────────────────
