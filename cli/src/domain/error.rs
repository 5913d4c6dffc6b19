//! Typed error vocabularies.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! `RunSignal` is a closed set of control-flow signals the confirmation and
//! policy protocols compare by variant (via `anyhow::Error::downcast_ref`),
//! never by identity. All types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use serde::Deserialize;
use thiserror::Error;

// ── Control-flow signals ──────────────────────────────────────────────────────

/// Outcomes of the confirmation protocol that are errors for the operation
/// but expected states for the protocol itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RunSignal {
    #[error("Apply discarded.")]
    ApplyDiscarded,

    #[error("Destroy discarded.")]
    DestroyDiscarded,

    #[error("the run was discarded using the UI or API")]
    RunDiscarded,

    #[error("the run was approved using the UI or API")]
    RunApproved,

    #[error("the run was overridden using the UI or API")]
    RunOverridden,

    #[error(
        "The soft-failed policy check requires confirmation, but input is disabled. \
         Override or discard this run in the UI."
    )]
    PolicyOverrideNeedsUiConfirmation,
}

impl RunSignal {
    /// Map the "run discarded out-of-band" cause to the operation-scoped
    /// discard error.
    #[must_use]
    pub fn discarded_for(destroy: bool) -> Self {
        if destroy {
            Self::DestroyDiscarded
        } else {
            Self::ApplyDiscarded
        }
    }
}

/// Why a poll loop gave up waiting: the hard stop signal or the softer
/// operator interrupt. Callers distinguish the two for exit-code purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelSignal {
    #[error("operation stopped")]
    Stop,

    #[error("operation interrupted")]
    Interrupt,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the local client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No hostname configured. Set 'hostname' in the config file or STRATO_HOSTNAME.")]
    MissingHostname,

    #[error("No organization configured. Set 'organization' in the config file.")]
    MissingOrganization,

    #[error("No API token configured. Set 'token' in the config file or STRATO_TOKEN.")]
    MissingToken,
}

// ── Remote API errors ─────────────────────────────────────────────────────────

/// Error mapping for non-2xx responses from the remote run service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    /// One or more structured errors decoded from the response body.
    #[error("{0}")]
    Remote(String),

    /// The body could not be decoded; fall back to the HTTP status line.
    #[error("{0}")]
    Status(String),
}

#[derive(Debug, Deserialize)]
struct ErrorsPayload {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

impl ApiError {
    /// Map a non-2xx response to an error: 401 and 404 have fixed meanings;
    /// anything else decodes the structured error list from the body, or
    /// falls back to the raw status line when the body is undecodable.
    #[must_use]
    pub fn from_response(status: u16, status_line: &str, body: &[u8]) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            _ => match serde_json::from_slice::<ErrorsPayload>(body) {
                Ok(payload) if !payload.errors.is_empty() => {
                    let errs: Vec<String> = payload
                        .errors
                        .into_iter()
                        .map(|e| {
                            if e.detail.is_empty() {
                                e.title
                            } else {
                                format!("{}\n\n{}", e.title, e.detail)
                            }
                        })
                        .collect();
                    Self::Remote(errs.join("\n"))
                }
                _ => Self::Status(status_line.to_string()),
            },
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
