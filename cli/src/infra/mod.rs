//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP calls to the remote
//! run service, terminal input, and configuration persistence.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod api;
pub mod config;
pub mod prompt;

pub use api::HttpRunService;
pub use config::YamlConfigStore;
pub use prompt::StdinPrompt;
