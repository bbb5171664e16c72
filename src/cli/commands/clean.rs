//! Clean command - remove build artifacts.

use anyhow::Result;

use crate::engine::dispatch::{dispatch, Action};
use crate::engine::{CheckRegistry, Context};
use crate::executor::{PlanExecutor, ProcessExecutor};
use crate::ui::output;

/// Remove build artifacts for the current project or the whole workspace.
pub fn clean(ctx: &Context) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let plan = dispatch(
        &Action::Clean,
        &invocation.context,
        &registry,
        &invocation.config,
    )?;

    for target in plan
        .param("targets")
        .unwrap_or("")
        .split(',')
        .filter(|t| !t.is_empty())
    {
        output::debug(format!("removing {}", target), verbosity);
    }

    let outcome = ProcessExecutor::new().execute(&plan)?;
    output::success(&outcome.summary, verbosity);
    Ok(outcome.exit_code)
}
