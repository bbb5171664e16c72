//! Build command - production bundles and Docker images.

use anyhow::Result;

use crate::engine::dispatch::{dispatch, Action, BuildOptions};
use crate::engine::{CheckRegistry, Context};
use crate::executor::{PlanExecutor, ProcessExecutor};
use crate::ui::output;

/// Build production artifacts for the current project.
pub fn build(ctx: &Context, docker: bool) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let plan = dispatch(
        &Action::Build(BuildOptions { docker }),
        &invocation.context,
        &registry,
        &invocation.config,
    )?;

    output::print(
        format!(
            "building {} for {}",
            plan.param("kind").unwrap_or("artifacts"),
            invocation.context.position()
        ),
        verbosity,
    );

    let outcome = ProcessExecutor::new().execute(&plan)?;
    if outcome.is_success() {
        output::success("build finished", verbosity);
    }
    Ok(outcome.exit_code)
}
