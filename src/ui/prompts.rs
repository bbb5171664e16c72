//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

fn read_line() -> Result<String, PromptError> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(PromptError::Cancelled);
    }
    Ok(line.trim().to_string())
}

/// Prompt for confirmation (yes/no).
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// An empty answer takes the default.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    print!("{} {} ", message, suffix);
    io::stdout().flush()?;

    let answer = read_line()?;
    Ok(match answer.to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Prompt for text input.
///
/// An empty answer takes the default when one is given.
pub fn input(
    message: &str,
    default: Option<&str>,
    interactive: bool,
) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    match default {
        Some(default) if !default.is_empty() => print!("{} [{}]: ", message, default),
        _ => print!("{}: ", message),
    }
    io::stdout().flush()?;

    let answer = read_line()?;
    if answer.is_empty() {
        return Ok(default.unwrap_or("").to_string());
    }
    Ok(answer)
}

/// Prompt for masked input (e.g., secret keys).
///
/// The input is not echoed to the terminal.
pub fn password(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    rpassword::prompt_password(format!("{}: ", message))
        .map_err(|err| PromptError::IoError(err.to_string()))
}
