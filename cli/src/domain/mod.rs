//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod backoff;
pub mod config;
pub mod cost;
pub mod error;
pub mod operation;
pub mod plan;
pub mod policy;
pub mod run;

pub use backoff::{BACKOFF_MAX_MS, BACKOFF_MIN_MS, RUN_POLL_INTERVAL, backoff};
pub use config::StratoConfig;
pub use cost::{CostEstimate, CostEstimateStatus, split_delta};
pub use error::{ApiError, CancelSignal, ConfigError, RunSignal};
pub use operation::{Operation, OperationType};
pub use plan::{
    JsonPlan, Plan, PlanMode, PlanStatus, RendererOpt, change_summary, plan_mode_for, run_header,
    run_url,
};
pub use policy::{
    PolicyActions, PolicyCheck, PolicyPermissions, PolicyScope, PolicyStatus, override_eligible,
};
pub use run::{
    Capacity, Page, QueueScan, QueuedRun, ResourceRef, Run, RunActions, RunStatus, Workspace,
};
