//! Domain types and validators for the client configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Top-level configuration stored in `~/.strato/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StratoConfig {
    /// Hostname of the remote run service, e.g. `strato.example.com`.
    pub hostname: String,
    /// Organization the configured workspaces belong to.
    pub organization: String,
    /// Bearer token for the remote API.
    pub token: String,
}

impl StratoConfig {
    /// Validate that every field required to reach the remote service is
    /// present.
    ///
    /// # Errors
    ///
    /// Returns the first missing-field error.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.is_empty() {
            return Err(ConfigError::MissingHostname.into());
        }
        if self.organization.is_empty() {
            return Err(ConfigError::MissingOrganization.into());
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken.into());
        }
        Ok(())
    }

    /// Base URL of the remote API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("https://{}/api/v1/", self.hostname)
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
