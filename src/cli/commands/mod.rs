//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves the invocation (scan + resolve, with warnings surfaced)
//! 2. Asks the engine to dispatch the action into a plan
//! 3. Hands the plan to an executor and propagates the outcome
//!
//! Handlers never decide validity or health themselves; that is the
//! engine's job.

pub mod build;
pub mod clean;
pub mod completion;
pub mod db;
pub mod dev;
pub mod setup;
pub mod validate;

pub use build::build;
pub use clean::clean;
pub use completion::completion;
pub use db::{migrate, sync_users};
pub use dev::dev;
pub use setup::{install, setup};
pub use validate::validate;

use anyhow::Result;

use crate::cli::args::{Command, DbCommand};
use crate::engine::{self, Context, ResolvedInvocation};
use crate::ui::output::{self, Verbosity};

/// Dispatch a command to its handler. Returns the exit code.
pub fn dispatch(command: Command, ctx: &Context) -> Result<i32> {
    match command {
        Command::Setup => setup::setup(ctx),
        Command::Validate { deploy, json } => validate::validate(ctx, deploy, json),
        Command::Install => setup::install(ctx),
        Command::Dev => dev::dev(ctx),
        Command::Build { docker } => build::build(ctx, docker),
        Command::Db(DbCommand::Migrate) => db::migrate(ctx),
        Command::Db(DbCommand::SyncUsers) => db::sync_users(ctx),
        Command::Clean => clean::clean(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Shared scan/resolve preamble for workspace commands.
///
/// Resolution and configuration warnings are surfaced once here so every
/// handler reports them consistently.
pub(crate) fn resolve_for(ctx: &Context) -> Result<(ResolvedInvocation, Verbosity)> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let cwd = ctx.working_dir()?;
    let invocation = engine::resolve_invocation(&cwd)?;

    for warning in &invocation.config_warnings {
        output::debug(format!("{} ({})", warning.message, warning.path.display()), verbosity);
    }
    for warning in invocation.context.warnings() {
        output::warn(warning, verbosity);
    }

    Ok((invocation, verbosity))
}
