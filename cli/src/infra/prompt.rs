//! Terminal implementation of the `InputPrompt` port.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InputOpts, InputPrompt};

/// Reads operator answers from standard input, one line per question.
///
/// The read is raced against the cancellation token so a prompt left
/// unanswered does not keep the process alive once the run has been
/// decided elsewhere.
pub struct StdinPrompt;

impl InputPrompt for StdinPrompt {
    async fn prompt(
        &self,
        cancel: &CancellationToken,
        opts: &InputOpts<'_>,
    ) -> Result<Option<String>> {
        println!("{}", opts.query);
        if !opts.description.is_empty() {
            println!("  {}", opts.description);
        }
        println!();
        print!("  Enter a value: ");
        std::io::stdout().flush().context("cannot flush stdout")?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        tokio::select! {
            () = cancel.cancelled() => Ok(None),
            read = reader.read_line(&mut line) => {
                let n = read.with_context(|| format!("failed to read answer for {}", opts.id))?;
                println!();
                if n == 0 {
                    // EOF on stdin counts as an empty answer, not a cancel.
                    return Ok(Some(String::new()));
                }
                Ok(Some(line.trim().to_string()))
            }
        }
    }
}
