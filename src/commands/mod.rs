//! CLI command implementations.
//!
//! This layer renders data and dispatches actions; it catches nothing.
//! Errors propagate to main, which prints them and exits non-zero.

pub mod branches;
pub mod browse;
pub mod init;
pub mod lifecycle;
pub mod open;

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, bail};

/// `[y/N]` confirmation on stderr/stdin. `yes` bypasses the prompt; a
/// non-interactive stdin refuses instead of hanging.
pub(crate) fn confirm(prompt: &str, yes: bool) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        bail!("refusing to proceed without confirmation (pass --yes for non-interactive use)");
    }

    eprint!("{prompt} [y/N] ");
    io::stderr().flush().context("failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read confirmation")?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
