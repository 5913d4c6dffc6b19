//! Application services — use-case orchestration.
//!
//! Each service module implements one protocol of the run lifecycle by
//! composing domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application::ports` — never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

pub mod confirm;
pub mod cost;
pub mod drive;
pub mod plan_read;
pub mod policy;
pub mod run_watch;

use std::time::Duration;

use crate::application::ports::{InputPrompt, OutputSink, RunService};

/// Horizontal rule separating lifecycle stages in the narration.
pub(crate) const DIVIDER: &str =
    "------------------------------------------------------------------------";

/// Drives one run through its lifecycle against the remote service.
///
/// Bundles the ports and the remote-host identity every protocol needs.
/// One driver serves one operation at a time; the individual protocols keep
/// their own timers and iteration counters as locals.
pub struct RunDriver<'a, S, O, P> {
    /// Remote run service client.
    pub api: &'a S,
    /// Narration sink.
    pub out: &'a O,
    /// Operator input prompt.
    pub prompt: &'a P,
    /// Configured remote hostname, used for run URLs and the plan-retrieval
    /// hostname guard.
    pub hostname: &'a str,
    /// Organization the target workspace belongs to.
    pub organization: &'a str,
    /// Mirrors the `--no-input` flag: when `false`, every interactive
    /// confirmation is refused rather than prompted.
    pub input_enabled: bool,
}

impl<'a, S, O, P> RunDriver<'a, S, O, P>
where
    S: RunService,
    O: OutputSink,
    P: InputPrompt,
{
    pub fn new(
        api: &'a S,
        out: &'a O,
        prompt: &'a P,
        hostname: &'a str,
        organization: &'a str,
        input_enabled: bool,
    ) -> Self {
        Self {
            api,
            out,
            prompt,
            hostname,
            organization,
            input_enabled,
        }
    }
}

/// Format an elapsed wait as the remote service's narration does:
/// truncated to 30-second steps, largest unit first, e.g. `"1m30s"`.
#[must_use]
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs() / 30 * 30;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
