//! Application context — unified state passed to every command handler.
//!
//! `AppContext` bundles the validated configuration, the HTTP client for the
//! remote run service, and the output context. Adding a new cross-cutting
//! concern (e.g. `--verbose`, telemetry) requires only one field change here.

use anyhow::{Context, Result};

use crate::domain::StratoConfig;
use crate::infra::{HttpRunService, YamlConfigStore};
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress progress narration.
    pub quiet: bool,
    /// Never ask for operator input (also set by the `CI` env var).
    pub no_input: bool,
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()` and passed as `&AppContext` to all
/// command handlers.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Validated configuration (hostname, organization, token).
    pub config: StratoConfig,
    /// HTTP client for the remote run service.
    pub api: HttpRunService,
    /// When `true`, prompts are never shown and runs that would need one
    /// fail with a link to decide them in the web UI.
    pub input_enabled: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is missing or incomplete,
    /// or when the HTTP client cannot be built.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let config = YamlConfigStore
            .load()
            .context("failed to load configuration")?;
        config.validate()?;

        let ci_env = std::env::var("CI").is_ok();
        let input_enabled = !flags.no_input && !ci_env;

        let api = HttpRunService::new(&config)?;

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config,
            api,
            input_enabled,
        })
    }
}
