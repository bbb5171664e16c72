//! Validate command - print a health report for the current context.

use anyhow::Result;
use thiserror::Error;

use crate::engine::dispatch::{dispatch, Action, ValidateOptions};
use crate::engine::{evaluate, CheckRegistry, CheckStatus, Context};
use crate::ui::output;

/// The report's overall status was `fail`.
///
/// Validate never blocks on health - the report is always printed - but
/// the exit code must reflect it.
#[derive(Debug, Error)]
#[error("validation found {fail_count} failing check(s)")]
pub struct ValidationFailed {
    /// Number of failing results in the report.
    pub fail_count: usize,
}

/// Check whether the environment is properly configured.
pub fn validate(ctx: &Context, deploy: bool, json: bool) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let action = Action::Validate(ValidateOptions { deploy });
    dispatch(&action, &invocation.context, &registry, &invocation.config)?;

    let report = evaluate(
        &registry,
        &invocation.context,
        action.check_mode(),
        &invocation.config,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mode = if deploy { "deployment" } else { "development" };
        output::print(
            format!(
                "\nValidating {} environment ({})...\n",
                mode,
                invocation.context.position()
            ),
            verbosity,
        );
        println!("{}", output::format_report(&report));
    }

    if report.overall() == CheckStatus::Fail {
        if !json {
            output::print("\nRun 'dh setup' to fix configuration issues", verbosity);
        }
        return Err(ValidationFailed {
            fail_count: report.fail_count(),
        }
        .into());
    }

    Ok(0)
}
