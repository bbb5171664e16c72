//! cli
//!
//! Command-line interface layer for devhand.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Map the error taxonomy to exit codes
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the [`crate::engine`] for decisions; execution goes through
//! [`crate::executor`].
//!
//! # Exit Codes
//!
//! - `0` - success
//! - `1` - validation or health-gate failure
//! - `2` - context resolution error (outside workspace, unsupported action)
//! - `3` - unexpected internal error

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::config::ConfigError;
use crate::engine::{ContextError, DispatchError, EngineError, WorkspaceError};
use anyhow::Result;

use commands::validate::ValidationFailed;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Returns the exit
/// code to use on success (delegated processes propagate theirs).
pub fn run() -> Result<i32> {
    let cli = Cli::parse_args();

    // Create context from CLI flags.
    let ctx = crate::engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
    };

    // Dispatch to command handler
    commands::dispatch(cli.command, &ctx)
}

/// Map an error to the exit-code convention.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ValidationFailed>().is_some() {
        return 1;
    }
    if let Some(dispatch) = err.downcast_ref::<DispatchError>() {
        return match dispatch {
            DispatchError::HealthGateFailed { .. } => 1,
            DispatchError::UnsupportedInContext { .. } => 2,
        };
    }
    if err.downcast_ref::<ContextError>().is_some() || err.downcast_ref::<WorkspaceError>().is_some()
    {
        return 2;
    }
    if let Some(engine) = err.downcast_ref::<EngineError>() {
        return match engine {
            EngineError::Workspace(_) | EngineError::Context(_) => 2,
            EngineError::Config(_) => 3,
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return 3;
    }
    3
}
