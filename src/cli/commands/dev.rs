//! Dev command - start the context-appropriate dev server.

use anyhow::Result;

use crate::engine::dispatch::{dispatch, Action};
use crate::engine::{CheckRegistry, Context};
use crate::executor::{PlanExecutor, ProcessExecutor};
use crate::ui::output;

/// Start the dev server for the current project.
///
/// The spawned process's exit code is propagated as ours.
pub fn dev(ctx: &Context) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let plan = dispatch(
        &Action::Dev,
        &invocation.context,
        &registry,
        &invocation.config,
    )?;

    output::print(
        format!(
            "starting {} dev server on port {}",
            invocation.context.position(),
            plan.param("port").unwrap_or("?")
        ),
        verbosity,
    );

    let outcome = ProcessExecutor::new().execute(&plan)?;
    output::debug(&outcome.summary, verbosity);
    Ok(outcome.exit_code)
}
