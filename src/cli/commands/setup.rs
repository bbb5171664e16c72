//! Setup and install commands.
//!
//! Setup is the one command whose job is to reach a healthy state, so it
//! carries no health gate: it detects the workspace, reports tool status,
//! walks through credential configuration, and writes `dh.toml` plus the
//! per-project `.env` files.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::config::{envfile, DatabaseConfig, DhConfig};
use crate::engine::dispatch::{dispatch, Action};
use crate::engine::{evaluate, CheckMode, CheckRegistry, Context, Role};
use crate::executor::{PlanExecutor, ProcessExecutor};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts;

fn step(n: usize, total: usize, message: &str, verbosity: Verbosity) {
    output::print(format!("\n[{}/{}] {}", n, total, message), verbosity);
}

/// One-time setup of the development environment.
pub fn setup(ctx: &Context) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let context = &invocation.context;
    let registry = CheckRegistry::builtin();

    dispatch(&Action::Setup, context, &registry, &invocation.config)?;

    output::print("Setting up development environment...", verbosity);

    // Step 1: project structure
    step(1, 4, "Detecting project structure...", verbosity);
    if let Some(fe) = context.unique_with_role(Role::Frontend) {
        output::success(format!("  frontend detected: {}", fe.path.display()), verbosity);
    }
    if let Some(be) = context.unique_with_role(Role::Backend) {
        output::success(format!("  backend detected: {}", be.path.display()), verbosity);
    }

    // Step 2: required tools
    step(2, 4, "Checking required tools...", verbosity);
    let report = evaluate(&registry, context, CheckMode::Standard, &invocation.config);
    output::print(output::format_report(&report), verbosity);

    // Step 3: database credentials and env files
    step(3, 4, "Configuring database credentials...", verbosity);
    if !ctx.interactive {
        output::warn(
            "skipping credential configuration (not interactive)",
            verbosity,
        );
    } else if prompts::confirm("Configure database credentials?", true, true)? {
        configure_credentials(context, &invocation.config, verbosity)?;
    }

    // Step 4: .env files must stay out of version control
    step(4, 4, "Verifying .gitignore...", verbosity);
    verify_gitignore(context, verbosity);

    output::success("\nSetup complete!", verbosity);
    output::print(
        "\nNext steps:\n  1. Run 'dh validate' to verify everything\n  2. Run 'dh db migrate' to initialize database tables\n  3. Run 'dh dev' to start a development server",
        verbosity,
    );
    Ok(0)
}

/// Prompt for credentials, then write `dh.toml` and both `.env` files.
///
/// Secrets never land in `dh.toml`; they go to the backend `.env` under
/// the variable named there.
fn configure_credentials(
    context: &crate::engine::ProjectContext,
    config: &DhConfig,
    verbosity: Verbosity,
) -> Result<()> {
    let existing = config.database();

    let url = prompts::input(
        "Database URL (e.g. https://xxx.supabase.co)",
        existing.url.as_deref(),
        true,
    )?;
    let public_key = prompts::input("Public/anon key (safe for the frontend)", None, true)?;
    let secret_key = prompts::password("Secret/service key (CLI only, kept in backend .env)", true)?;

    let api_url = if context.unique_with_role(Role::Backend).is_some() {
        prompts::input(
            "Backend API URL (for the frontend)",
            Some("http://localhost:8000"),
            true,
        )?
    } else {
        String::new()
    };

    let secret_var = existing
        .secret_key_var
        .clone()
        .unwrap_or_else(|| "SUPABASE_SECRET_KEY".to_string());

    // Persist the non-secret settings to dh.toml
    let mut workspace = config.workspace.clone().unwrap_or_default();
    workspace.database = Some(DatabaseConfig {
        url: Some(url.clone()),
        secret_key_var: Some(secret_var.clone()),
        ..existing
    });
    DhConfig::save_workspace(context.root(), &workspace)?;
    output::success(
        format!("  configuration saved to {}/dh.toml", context.root().display()),
        verbosity,
    );

    if let Some(fe) = context.unique_with_role(Role::Frontend) {
        let path = fe.path.join(".env");
        let mut vars = envfile::read_env(&path)?;
        upsert(&mut vars, "NEXT_PUBLIC_SUPABASE_URL", &url);
        upsert(&mut vars, "NEXT_PUBLIC_SUPABASE_KEY", &public_key);
        upsert(&mut vars, "NEXT_PUBLIC_API_URL", &api_url);
        envfile::write_env(&path, &vars)?;
        output::success(format!("  configuration saved to {}", path.display()), verbosity);
    }

    if let Some(be) = context.unique_with_role(Role::Backend) {
        let path = be.path.join(".env");
        let mut vars = envfile::read_env(&path)?;
        upsert(&mut vars, "SUPABASE_URL", &url);
        upsert(&mut vars, &secret_var, &secret_key);
        envfile::write_env(&path, &vars)?;
        output::success(format!("  configuration saved to {}", path.display()), verbosity);
    }

    Ok(())
}

fn upsert(vars: &mut BTreeMap<String, String>, key: &str, value: &str) {
    if !value.is_empty() {
        vars.insert(key.to_string(), value.to_string());
    }
}

fn verify_gitignore(context: &crate::engine::ProjectContext, verbosity: Verbosity) {
    for project in context.projects() {
        let gitignore = project.path.join(".gitignore");
        match std::fs::read_to_string(&gitignore) {
            Ok(contents) if contents.lines().any(|l| l.trim() == ".env") => {
                output::success(format!("  {} .env is gitignored", project.name), verbosity);
            }
            Ok(_) => {
                output::warn(
                    format!("{}: .env is not in .gitignore", project.name),
                    verbosity,
                );
            }
            Err(_) => {
                output::warn(format!("{}: no .gitignore found", project.name), verbosity);
            }
        }
    }
}

/// Install dependencies for every detected project.
pub fn install(ctx: &Context) -> Result<i32> {
    let (invocation, verbosity) = super::resolve_for(ctx)?;
    let registry = CheckRegistry::builtin();

    let plan = dispatch(
        &Action::Install,
        &invocation.context,
        &registry,
        &invocation.config,
    )?;

    output::print("Installing dependencies...", verbosity);
    let outcome = ProcessExecutor::new().execute(&plan)?;
    if outcome.is_success() {
        output::success(&outcome.summary, verbosity);
    } else {
        output::error(&outcome.summary);
    }
    Ok(outcome.exit_code)
}
