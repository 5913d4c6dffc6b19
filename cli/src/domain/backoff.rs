//! Poll pacing for the run, cost-estimate, and policy loops.
//!
//! Pure functions only — the loops that sleep on these values live in
//! `application::services`.

use std::time::Duration;

/// Lower bound for the poll backoff, in milliseconds.
pub const BACKOFF_MIN_MS: f64 = 1000.0;

/// Upper bound for the poll backoff, in milliseconds.
pub const BACKOFF_MAX_MS: f64 = 3000.0;

/// Fixed poll interval used by the confirmation watcher.
pub const RUN_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Compute the exponential backoff delay for the given iteration, bounded
/// by `min` and `max` (both in milliseconds).
///
/// The delay doubles every five iterations: `min * 2^(iter / 5)`, capped
/// at `max`.
#[must_use]
pub fn backoff(min: f64, max: f64, iter: u32) -> Duration {
    let mut delay = (2f64).powf(f64::from(iter) / 5.0) * min;
    if delay > max {
        delay = max;
    }
    Duration::from_millis(delay as u64)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
