//! Completion command - generate shell completions.

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::args::{Cli, Shell};

/// Generate completions for the given shell on stdout.
pub fn completion(shell: Shell) -> Result<i32> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "dh", &mut std::io::stdout());
    Ok(0)
}
