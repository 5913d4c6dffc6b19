//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::domain::OperationType;

/// Drive infrastructure runs on a remote execution service
#[derive(Parser)]
#[command(
    name = "strato",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress progress narration
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Never ask for operator input
    #[arg(long, global = true)]
    pub no_input: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a speculative run and show the resulting plan
    Plan(commands::plan::PlanArgs),

    /// Submit a run and confirm its changes
    Apply(commands::apply::ApplyArgs),

    /// Submit a destroy run and confirm it
    Destroy(commands::apply::ApplyArgs),

    /// Display the plan of an existing run
    Show(commands::show::ShowArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the command
    /// fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            no_input,
            command,
        } = self;
        let ctx = AppContext::new(&AppFlags {
            no_color,
            quiet,
            no_input,
        })?;
        match command {
            Command::Plan(args) => commands::plan::run(&ctx, &args).await,
            Command::Apply(args) => commands::apply::run(&ctx, &args, OperationType::Apply).await,
            Command::Destroy(args) => {
                commands::apply::run(&ctx, &args, OperationType::Destroy).await
            }
            Command::Show(args) => commands::show::run(&ctx, &args).await,
        }
    }
}
