//! Strato CLI - drive infrastructure runs on a remote execution service

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;

use strato_cli::cli::Cli;
use strato_cli::domain::CancelSignal;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        // 130 mirrors the shell convention for interrupt-terminated
        // processes so wrappers can tell an abandoned wait from a failure.
        let code = match e.downcast_ref::<CancelSignal>() {
            Some(CancelSignal::Interrupt) => 130,
            _ => 1,
        };
        std::process::exit(code);
    }
}
