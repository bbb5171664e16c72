//! Db commands - migrations and user sync, delegated to external runners.

use anyhow::Result;

use crate::engine::dispatch::{dispatch, Action};
use crate::engine::{CheckRegistry, Context};
use crate::executor::{PlanExecutor, ProcessExecutor};
use crate::ui::output;

/// Run database migrations.
///
/// Backend only, pass-only gate. The migration runner itself is an
/// external collaborator; the plan names the migrations directory and the
/// delegated command.
pub fn migrate(ctx: &Context) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let plan = dispatch(
        &Action::DbMigrate,
        &invocation.context,
        &registry,
        &invocation.config,
    )?;

    let migrations_dir = plan
        .target
        .path
        .join(plan.param("migrations_dir").unwrap_or("migrations"));
    if !migrations_dir.is_dir() {
        output::error(format!(
            "migrations directory not found: {}",
            migrations_dir.display()
        ));
        return Ok(1);
    }

    let mut migrations: Vec<String> = std::fs::read_dir(&migrations_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".sql"))
        .collect();
    migrations.sort();

    if migrations.is_empty() {
        output::warn("no migration files found", verbosity);
        return Ok(0);
    }

    output::print(
        format!("found {} migration(s)", migrations.len()),
        verbosity,
    );
    for name in &migrations {
        output::debug(format!("  {}", name), verbosity);
    }

    let outcome = ProcessExecutor::new().execute(&plan)?;
    if outcome.is_success() {
        output::success("migrations applied", verbosity);
    } else {
        output::error("migration runner failed");
    }
    Ok(outcome.exit_code)
}

/// Sync the allowed-users list to the database.
///
/// Reads the users file (one email per line, `#` comments allowed) and
/// delegates the sync to the configured command.
pub fn sync_users(ctx: &Context) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let plan = dispatch(
        &Action::DbSyncUsers,
        &invocation.context,
        &registry,
        &invocation.config,
    )?;

    let users_file = plan
        .target
        .path
        .join(plan.param("users_file").unwrap_or("allowed_users.txt"));
    if !users_file.is_file() {
        output::error(format!("users file not found: {}", users_file.display()));
        return Ok(1);
    }

    let emails: Vec<String> = std::fs::read_to_string(&users_file)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();

    if emails.is_empty() {
        output::warn("users file contains no emails", verbosity);
        return Ok(0);
    }

    output::print(format!("syncing {} user(s)", emails.len()), verbosity);

    let outcome = ProcessExecutor::new().execute(&plan)?;
    if outcome.is_success() {
        output::success("users synced", verbosity);
    } else {
        output::error("user sync failed");
    }
    Ok(outcome.exit_code)
}
