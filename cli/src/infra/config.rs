//! YAML configuration store with environment overrides.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::domain::config::StratoConfig;

/// Loads and persists `StratoConfig` as a YAML file on disk.
///
/// `STRATO_HOSTNAME`, `STRATO_ORGANIZATION` and `STRATO_TOKEN` override the
/// corresponding file values; `STRATO_CONFIG` relocates the file itself.
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// Load the configuration, applying environment overrides on top of the
    /// file contents. A missing file yields the default (empty) config so
    /// that a fully env-driven setup needs no file at all.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<StratoConfig> {
        let path = self.path()?;
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("cannot parse {}", path.display()))?
        } else {
            StratoConfig::default()
        };

        if let Ok(val) = std::env::var("STRATO_HOSTNAME") {
            config.hostname = val;
        }
        if let Ok(val) = std::env::var("STRATO_ORGANIZATION") {
            config.organization = val;
        }
        if let Ok(val) = std::env::var("STRATO_TOKEN") {
            config.token = val;
        }
        Ok(config)
    }

    /// Write the configuration back to disk, creating parent directories
    /// and restricting permissions since the file holds the API token.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or its directory cannot be written.
    pub fn save(&self, config: &StratoConfig) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }

    /// Resolve the config file location.
    ///
    /// # Errors
    ///
    /// Returns an error when the home directory cannot be determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("STRATO_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".strato").join("config.yaml"))
    }
}
