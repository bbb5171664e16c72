//! engine::checks
//!
//! The check registry: named, independent environment checks.
//!
//! # Architecture
//!
//! Every check is a plain function from a [`CheckContext`] to a
//! [`CheckResult`]. Expected absence conditions (a missing file, an
//! uninstalled tool) map to `fail`/`warn` results with a message, never to
//! a propagated error; [`CheckExecutionError`] is reserved for genuinely
//! unexpected failures, which the evaluator converts into `fail` results.
//!
//! Checks are pure functions of the filesystem/environment at call time and
//! never mutate state. Registration order is significant and is the report
//! order: dependency checks, then configuration checks, then
//! network/service checks, then deploy-only checks.
//!
//! # Scope and selection
//!
//! A check is either project-scoped (runs once per applicable target
//! project, keyed by project path) or workspace-scoped (runs once per
//! evaluation). Applicability is a pair of static sets: roles and modes.
//! Standard checks list both modes, so deploy mode is always a strict
//! superset of standard.

use std::io;
use std::net::TcpListener;
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

use super::health::{CheckResult, CheckStatus};
use super::resolve::ProjectContext;
use super::scan::{ProjectDescriptor, Role};
use crate::config::{envfile, DhConfig, WorkspaceConfig, WORKSPACE_CONFIG_FILE};

/// Validation mode selecting which checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMode {
    /// Local development readiness.
    Standard,
    /// Deployment readiness; strict superset of standard.
    Deploy,
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckMode::Standard => write!(f, "standard"),
            CheckMode::Deploy => write!(f, "deploy"),
        }
    }
}

/// Whether a check targets one project or the workspace as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckScope {
    /// Runs once per applicable target project.
    Project,
    /// Runs once per evaluation.
    Workspace,
}

/// Errors from inside a check's execution.
///
/// Contained by the evaluator; never surfaces past it.
#[derive(Debug, Error)]
pub enum CheckExecutionError {
    /// Unexpected I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The check was invoked without the target it needs.
    #[error("check requires a target project")]
    MissingTarget,
}

/// Everything a check may read.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The resolved invocation context.
    pub context: &'a ProjectContext,
    /// The target project for project-scoped checks.
    pub project: Option<&'a ProjectDescriptor>,
    /// Merged configuration.
    pub config: &'a DhConfig,
}

impl<'a> CheckContext<'a> {
    /// The target project, or `MissingTarget` for a misconfigured call.
    pub fn target(&self) -> Result<&'a ProjectDescriptor, CheckExecutionError> {
        self.project.ok_or(CheckExecutionError::MissingTarget)
    }
}

/// The uniform check capability: run and report.
pub type CheckFn = fn(&CheckContext) -> Result<CheckResult, CheckExecutionError>;

/// A registered environment check.
#[derive(Debug, Clone)]
pub struct CheckDefinition {
    /// Unique name; also the result's check name.
    pub name: &'static str,
    /// Roles this check applies to.
    pub roles: &'static [Role],
    /// Modes this check applies to.
    pub modes: &'static [CheckMode],
    /// Project- or workspace-scoped.
    pub scope: CheckScope,
    /// The check function.
    pub run: CheckFn,
}

impl CheckDefinition {
    /// Whether the check applies to a role.
    pub fn applies_to_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the check applies in a mode.
    pub fn applies_in_mode(&self, mode: CheckMode) -> bool {
        self.modes.contains(&mode)
    }

    /// Execute the check.
    pub fn run(&self, ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
        (self.run)(ctx)
    }
}

/// The ordered, read-only collection of checks.
///
/// Built once at process start and passed explicitly into the evaluator
/// and dispatcher; evaluation stays a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct CheckRegistry {
    checks: Vec<CheckDefinition>,
}

impl CheckRegistry {
    /// Build a registry from explicit definitions, preserving order.
    pub fn from_checks(checks: Vec<CheckDefinition>) -> Self {
        Self { checks }
    }

    /// The built-in check battery.
    pub fn builtin() -> Self {
        const BOTH: &[Role] = &[Role::Frontend, Role::Backend];
        const FE: &[Role] = &[Role::Frontend];
        const BE: &[Role] = &[Role::Backend];
        const ALL_MODES: &[CheckMode] = &[CheckMode::Standard, CheckMode::Deploy];
        const DEPLOY_ONLY: &[CheckMode] = &[CheckMode::Deploy];

        let checks = vec![
            // Dependency checks
            CheckDefinition {
                name: "node-installed",
                roles: FE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: node_installed,
            },
            CheckDefinition {
                name: "npm-installed",
                roles: FE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: npm_installed,
            },
            CheckDefinition {
                name: "python-installed",
                roles: BE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: python_installed,
            },
            CheckDefinition {
                name: "uv-installed",
                roles: BE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: uv_installed,
            },
            CheckDefinition {
                name: "docker-available",
                roles: BOTH,
                modes: ALL_MODES,
                scope: CheckScope::Workspace,
                run: docker_available,
            },
            CheckDefinition {
                name: "frontend-manifest",
                roles: FE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: frontend_manifest,
            },
            CheckDefinition {
                name: "frontend-deps",
                roles: FE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: frontend_deps,
            },
            CheckDefinition {
                name: "backend-manifest",
                roles: BE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: backend_manifest,
            },
            CheckDefinition {
                name: "backend-venv",
                roles: BE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: backend_venv,
            },
            // Configuration checks
            CheckDefinition {
                name: "workspace-config",
                roles: BOTH,
                modes: ALL_MODES,
                scope: CheckScope::Workspace,
                run: workspace_config,
            },
            CheckDefinition {
                name: "frontend-env",
                roles: FE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: frontend_env,
            },
            CheckDefinition {
                name: "backend-env",
                roles: BE,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: backend_env,
            },
            CheckDefinition {
                name: "database-config",
                roles: BOTH,
                modes: ALL_MODES,
                scope: CheckScope::Workspace,
                run: database_config,
            },
            // Network/service checks
            CheckDefinition {
                name: "dev-port-free",
                roles: BOTH,
                modes: ALL_MODES,
                scope: CheckScope::Project,
                run: dev_port_free,
            },
            // Deploy-only checks
            CheckDefinition {
                name: "deploy-env-complete",
                roles: BOTH,
                modes: DEPLOY_ONLY,
                scope: CheckScope::Project,
                run: deploy_env_complete,
            },
            CheckDefinition {
                name: "backend-url-remote",
                roles: FE,
                modes: DEPLOY_ONLY,
                scope: CheckScope::Project,
                run: backend_url_remote,
            },
            CheckDefinition {
                name: "backend-reachable",
                roles: FE,
                modes: DEPLOY_ONLY,
                scope: CheckScope::Project,
                run: backend_reachable,
            },
            CheckDefinition {
                name: "deploy-artifacts",
                roles: BE,
                modes: DEPLOY_ONLY,
                scope: CheckScope::Project,
                run: deploy_artifacts,
            },
        ];

        Self { checks }
    }

    /// All checks, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.checks.iter()
    }

    /// Look up a check by name.
    pub fn get(&self, name: &str) -> Option<&CheckDefinition> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tool presence
// ---------------------------------------------------------------------------

/// Probe a tool's version by spawning `<tool> --version`.
///
/// Any spawn or execution failure reads as "not installed".
fn tool_version(tool: &str) -> Option<String> {
    let output = Command::new(tool).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

fn tool_check(
    ctx: &CheckContext,
    check: &'static str,
    tool: &str,
    install_hint: &str,
) -> Result<CheckResult, CheckExecutionError> {
    let target = ctx.target()?;
    let key = target.path.to_string_lossy();
    Ok(match tool_version(tool) {
        Some(version) => CheckResult::pass(check, format!("{}: {}", tool, version)).keyed(&key),
        None => CheckResult::fail(check, format!("{} not installed", tool))
            .with_remediation(install_hint)
            .keyed(&key),
    })
}

fn node_installed(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    tool_check(ctx, "node-installed", "node", "install Node.js from https://nodejs.org")
}

fn npm_installed(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    tool_check(ctx, "npm-installed", "npm", "npm ships with Node.js; reinstall Node.js")
}

fn python_installed(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    tool_check(ctx, "python-installed", "python3", "install Python 3")
}

fn uv_installed(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    tool_check(
        ctx,
        "uv-installed",
        "uv",
        "curl -LsSf https://astral.sh/uv/install.sh | sh",
    )
}

fn docker_available(_ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    Ok(match tool_version("docker") {
        Some(version) => CheckResult::pass("docker-available", format!("docker: {}", version)),
        None => CheckResult::warn(
            "docker-available",
            "Docker not installed (optional, needed for containerization)",
        ),
    })
}

// ---------------------------------------------------------------------------
// Manifests and dependencies
// ---------------------------------------------------------------------------

fn file_check(
    ctx: &CheckContext,
    check: &'static str,
    file: &str,
    missing_status: CheckStatus,
    remediation: &str,
) -> Result<CheckResult, CheckExecutionError> {
    let target = ctx.target()?;
    let key = target.path.to_string_lossy().into_owned();
    let path = target.path.join(file);
    Ok(if path.exists() {
        CheckResult::pass(check, format!("{} exists", file)).keyed(&key)
    } else {
        let message = format!("{} not found", file);
        let missing = match missing_status {
            CheckStatus::Warn => CheckResult::warn(check, message),
            _ => CheckResult::fail(check, message),
        };
        missing.with_remediation(remediation).keyed(&key)
    })
}

fn frontend_manifest(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    file_check(
        ctx,
        "frontend-manifest",
        "package.json",
        CheckStatus::Fail,
        "the frontend project needs a package.json",
    )
}

fn frontend_deps(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    file_check(
        ctx,
        "frontend-deps",
        "node_modules",
        CheckStatus::Warn,
        "run 'dh install'",
    )
}

fn backend_manifest(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    file_check(
        ctx,
        "backend-manifest",
        "pyproject.toml",
        CheckStatus::Fail,
        "the backend project needs a pyproject.toml",
    )
}

fn backend_venv(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    file_check(
        ctx,
        "backend-venv",
        ".venv",
        CheckStatus::Warn,
        "run 'dh install'",
    )
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn workspace_config(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    let path = ctx.context.root().join(WORKSPACE_CONFIG_FILE);
    if !path.is_file() {
        return Ok(CheckResult::warn(
            "workspace-config",
            format!("{} not found; using defaults", WORKSPACE_CONFIG_FILE),
        )
        .with_remediation("run 'dh setup'"));
    }
    let raw = std::fs::read_to_string(&path)?;
    Ok(match toml::from_str::<WorkspaceConfig>(&raw) {
        Ok(_) => CheckResult::pass(
            "workspace-config",
            format!("{} is valid", WORKSPACE_CONFIG_FILE),
        ),
        Err(err) => CheckResult::fail(
            "workspace-config",
            format!("{} is malformed: {}", WORKSPACE_CONFIG_FILE, err),
        ),
    })
}

fn frontend_env(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    file_check(
        ctx,
        "frontend-env",
        ".env",
        CheckStatus::Warn,
        "run 'dh setup'",
    )
}

fn backend_env(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    // Optional for the backend; absence is only worth a note.
    file_check(
        ctx,
        "backend-env",
        ".env",
        CheckStatus::Warn,
        ".env is optional for the backend; run 'dh setup' to create one",
    )
}

fn database_config(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    let database = ctx.config.database();
    let Some(url) = database.url.filter(|u| !u.is_empty()) else {
        return Ok(CheckResult::fail(
            "database-config",
            "database not configured",
        )
        .with_remediation("run 'dh setup'"));
    };

    let Some(secret_var) = database.secret_key_var.filter(|v| !v.is_empty()) else {
        return Ok(CheckResult::warn(
            "database-config",
            format!("database URL configured ({}), but no secret key variable", url),
        )
        .with_remediation("run 'dh setup'"));
    };

    if secret_configured(ctx, &secret_var)? {
        Ok(CheckResult::pass(
            "database-config",
            format!("database URL configured: {}", url),
        ))
    } else {
        Ok(CheckResult::warn(
            "database-config",
            format!("database credentials incomplete: {} is not set", secret_var),
        )
        .with_remediation("run 'dh setup'"))
    }
}

/// A secret counts as configured when its variable is set in the process
/// environment or in the backend project's `.env`.
fn secret_configured(ctx: &CheckContext, var: &str) -> Result<bool, CheckExecutionError> {
    if std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false) {
        return Ok(true);
    }
    let Some(backend) = ctx.context.unique_with_role(Role::Backend) else {
        return Ok(false);
    };
    let vars = envfile::read_env(&backend.path.join(".env"))?;
    Ok(vars.get(var).map(|v| !v.is_empty()).unwrap_or(false))
}

// ---------------------------------------------------------------------------
// Network/service
// ---------------------------------------------------------------------------

fn dev_port_free(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    let target = ctx.target()?;
    let key = target.path.to_string_lossy().into_owned();
    let dev = ctx.config.dev();
    let port = match target.role {
        Role::Backend => dev.backend_port,
        _ => dev.frontend_port,
    };

    Ok(match TcpListener::bind(("127.0.0.1", port)) {
        Ok(_) => CheckResult::pass("dev-port-free", format!("port {} is free", port)).keyed(&key),
        Err(err) if err.kind() == io::ErrorKind::AddrInUse => CheckResult::warn(
            "dev-port-free",
            format!("port {} is already in use", port),
        )
        .with_remediation("another dev server may be running; stop it or change the port in dh.toml")
        .keyed(&key),
        Err(err) => CheckResult::warn(
            "dev-port-free",
            format!("could not probe port {}: {}", port, err),
        )
        .keyed(&key),
    })
}

// ---------------------------------------------------------------------------
// Deploy readiness
// ---------------------------------------------------------------------------

fn deploy_env_complete(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    let target = ctx.target()?;
    let key = target.path.to_string_lossy().into_owned();
    let vars = envfile::read_env(&target.path.join(".env"))?;

    let required: Vec<String> = match target.role {
        Role::Frontend => ctx.config.deploy().required_env,
        _ => ctx
            .config
            .database()
            .secret_key_var
            .into_iter()
            .collect(),
    };

    if required.is_empty() {
        return Ok(CheckResult::pass(
            "deploy-env-complete",
            "no required environment variables declared",
        )
        .keyed(&key));
    }

    let missing: Vec<&str> = required
        .iter()
        .filter(|var| vars.get(var.as_str()).map(|v| v.is_empty()).unwrap_or(true))
        .map(String::as_str)
        .collect();

    Ok(if missing.is_empty() {
        CheckResult::pass(
            "deploy-env-complete",
            "all required environment variables configured",
        )
        .keyed(&key)
    } else {
        CheckResult::fail(
            "deploy-env-complete",
            format!("missing environment variables: {}", missing.join(", ")),
        )
        .with_remediation("run 'dh setup'")
        .keyed(&key)
    })
}

fn api_url(ctx: &CheckContext, target: &ProjectDescriptor) -> Result<Option<String>, CheckExecutionError> {
    let vars = envfile::read_env(&target.path.join(".env"))?;
    Ok(vars
        .get(&ctx.config.deploy().api_url_var)
        .filter(|v| !v.is_empty())
        .cloned())
}

fn is_local_url(url: &str) -> bool {
    url.contains("localhost") || url.contains("127.0.0.1")
}

fn backend_url_remote(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    let target = ctx.target()?;
    let key = target.path.to_string_lossy().into_owned();
    Ok(match api_url(ctx, target)? {
        None => CheckResult::fail("backend-url-remote", "backend API URL not configured in .env")
            .with_remediation("run 'dh setup'")
            .keyed(&key),
        Some(url) if is_local_url(&url) => CheckResult::fail(
            "backend-url-remote",
            format!("backend URL is localhost: {}", url),
        )
        .with_remediation("deploy the backend and update the API URL in .env")
        .keyed(&key),
        Some(url) => {
            CheckResult::pass("backend-url-remote", format!("backend URL configured: {}", url))
                .keyed(&key)
        }
    })
}

fn backend_reachable(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    let target = ctx.target()?;
    let key = target.path.to_string_lossy().into_owned();
    let Some(url) = api_url(ctx, target)? else {
        return Ok(CheckResult::warn(
            "backend-reachable",
            "probe skipped: backend API URL not configured",
        )
        .keyed(&key));
    };

    let timeout = Duration::from_secs(ctx.config.deploy().probe_timeout_secs);
    Ok(match probe_url(&url, timeout) {
        ProbeOutcome::Responded(status) => CheckResult::pass(
            "backend-reachable",
            format!("backend API responded ({})", status),
        )
        .keyed(&key),
        ProbeOutcome::TimedOut => CheckResult::fail(
            "backend-reachable",
            format!("backend API request timed out after {}s", timeout.as_secs()),
        )
        .with_remediation("verify the deployment is up and the URL is correct")
        .keyed(&key),
        ProbeOutcome::Failed(detail) => CheckResult::fail(
            "backend-reachable",
            format!("backend API is not accessible: {}", detail),
        )
        .with_remediation("verify the deployment is up and the URL is correct")
        .keyed(&key),
    })
}

enum ProbeOutcome {
    Responded(u16),
    TimedOut,
    Failed(String),
}

/// Issue one GET against `url` on a private current-thread runtime.
///
/// The client timeout bounds the whole probe, so a slow endpoint resolves
/// this single check without hanging the report.
fn probe_url(url: &str, timeout: Duration) -> ProbeOutcome {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => return ProbeOutcome::Failed(err.to_string()),
    };

    runtime.block_on(async {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => return ProbeOutcome::Failed(err.to_string()),
        };
        match client.get(url).send().await {
            Ok(response) => ProbeOutcome::Responded(response.status().as_u16()),
            Err(err) if err.is_timeout() => ProbeOutcome::TimedOut,
            Err(err) => ProbeOutcome::Failed(err.to_string()),
        }
    })
}

fn deploy_artifacts(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
    file_check(
        ctx,
        "deploy-artifacts",
        "requirements.txt",
        CheckStatus::Fail,
        "export it with 'uv export --no-dev --no-hashes --output-file requirements.txt'",
    )
}
