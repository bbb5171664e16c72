//! engine::dispatch
//!
//! The command dispatcher: decide what may run, and with what parameters.
//!
//! # Architecture
//!
//! Given a requested [`Action`], the resolved [`ProjectContext`], and the
//! check registry, dispatch decides whether the action is legal for the
//! context's role, lazily evaluates health when the action declares a gate,
//! and emits an [`ActionPlan`] for an external executor. Dispatch itself
//! never executes anything.
//!
//! # Gates
//!
//! - `setup`, `validate`, `install`, `clean`: ungated. Setup and install
//!   exist to reach a healthy state; validate exists to report; clean must
//!   work from a broken environment to allow recovery.
//! - `dev`, `build`: warn-or-better. A dev server relying on missing
//!   dependencies cannot meaningfully start.
//! - `db migrate`, `db sync-users`: pass-only. Database operations from a
//!   degraded environment risk inconsistent state, so the gate trades
//!   convenience for safety.
//!
//! # Invariants
//!
//! - Plan resolution is deterministic given identical context+health+options
//! - Health is evaluated at most once per dispatch, and only when gated

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use super::checks::{CheckMode, CheckRegistry};
use super::evaluate::evaluate;
use super::gate::{gate, GateBlock, GateResult, HealthGate};
use super::resolve::ProjectContext;
use super::scan::{ProjectDescriptor, Role};
use crate::config::DhConfig;

/// Options for `validate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Validate deployment readiness instead of local development.
    pub deploy: bool,
}

/// Options for `build`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Build a Docker image instead of a production bundle.
    pub docker: bool,
}

/// A requested action with its enumerated options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Interactive environment setup.
    Setup,
    /// Environment validation report.
    Validate(ValidateOptions),
    /// Install project dependencies.
    Install,
    /// Start the context-appropriate dev server.
    Dev,
    /// Build production artifacts.
    Build(BuildOptions),
    /// Run database migrations.
    DbMigrate,
    /// Sync allowed users to the database.
    DbSyncUsers,
    /// Remove build artifacts.
    Clean,
}

impl Action {
    /// Stable action name used in plans and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Setup => "setup",
            Action::Validate(_) => "validate",
            Action::Install => "install",
            Action::Dev => "dev",
            Action::Build(_) => "build",
            Action::DbMigrate => "db migrate",
            Action::DbSyncUsers => "db sync-users",
            Action::Clean => "clean",
        }
    }

    /// The health threshold this action requires.
    pub fn gate(&self) -> HealthGate {
        match self {
            Action::Setup | Action::Validate(_) | Action::Install | Action::Clean => {
                HealthGate::Ungated
            }
            Action::Dev | Action::Build(_) => HealthGate::WarnOrBetter,
            Action::DbMigrate | Action::DbSyncUsers => HealthGate::PassOnly,
        }
    }

    /// The check mode used when this action evaluates health.
    pub fn check_mode(&self) -> CheckMode {
        match self {
            Action::Validate(opts) if opts.deploy => CheckMode::Deploy,
            _ => CheckMode::Standard,
        }
    }
}

/// Errors from dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The action is not valid for the context's current role.
    #[error("'{action}' is not supported from the {position}: {detail}")]
    UnsupportedInContext {
        /// The requested action.
        action: &'static str,
        /// Human description of the current position.
        position: String,
        /// Why the action cannot run here.
        detail: String,
    },

    /// The action's health threshold was not met.
    #[error("cannot run '{action}': {block}")]
    HealthGateFailed {
        /// The requested action.
        action: &'static str,
        /// The gate that blocked it.
        block: GateBlock,
    },
}

/// The target a plan operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTarget {
    /// Directory the executor should operate in.
    pub path: PathBuf,
    /// Role of the target project; `None` for the workspace as a whole.
    pub role: Option<Role>,
}

/// A resolved, executable plan.
///
/// Produced by dispatch, consumed immediately by an executor, never
/// stored. Parameters are a sorted map so identical inputs render
/// identical plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    /// Action name.
    pub action: &'static str,
    /// What the plan targets.
    pub target: PlanTarget,
    /// Resolved parameters.
    pub params: BTreeMap<String, String>,
    /// The gate that admitted this plan.
    pub gate: HealthGate,
}

impl ActionPlan {
    /// Fetch a parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Decide whether `action` may run in `context`, and resolve its plan.
///
/// Health is evaluated lazily: ungated actions never touch the registry.
pub fn dispatch(
    action: &Action,
    context: &ProjectContext,
    registry: &CheckRegistry,
    config: &DhConfig,
) -> Result<ActionPlan, DispatchError> {
    let target = resolve_target(action, context)?;

    let threshold = action.gate();
    if threshold.requires_report() {
        let report = evaluate(registry, context, CheckMode::Standard, config);
        if let GateResult::Blocked(block) = gate(&report, threshold) {
            return Err(DispatchError::HealthGateFailed {
                action: action.name(),
                block,
            });
        }
    }

    let params = resolve_params(action, context, &target, config);
    Ok(ActionPlan {
        action: action.name(),
        target,
        params,
        gate: threshold,
    })
}

/// Role/position validity rules per action.
fn resolve_target(action: &Action, context: &ProjectContext) -> Result<PlanTarget, DispatchError> {
    let workspace = PlanTarget {
        path: context.root().to_path_buf(),
        role: None,
    };
    let project_target = |p: &ProjectDescriptor| PlanTarget {
        path: p.path.clone(),
        role: Some(p.role),
    };

    match action {
        Action::Setup | Action::Clean => Ok(context.current().map(project_target).unwrap_or(workspace)),

        Action::Validate(_) => Ok(context.current().map(project_target).unwrap_or(workspace)),

        Action::Install => {
            if context.projects().is_empty() {
                return Err(DispatchError::UnsupportedInContext {
                    action: action.name(),
                    position: context.position(),
                    detail: "no projects detected in the workspace".to_string(),
                });
            }
            Ok(workspace)
        }

        Action::Dev | Action::Build(_) => match context.current() {
            Some(p) if matches!(p.role, Role::Frontend | Role::Backend) => Ok(project_target(p)),
            Some(p) => Err(DispatchError::UnsupportedInContext {
                action: action.name(),
                position: context.position(),
                detail: format!("project '{}' has no recognized role", p.name),
            }),
            None => Err(DispatchError::UnsupportedInContext {
                action: action.name(),
                position: context.position(),
                detail: "run it from inside a frontend or backend project".to_string(),
            }),
        },

        Action::DbMigrate | Action::DbSyncUsers => match context.current() {
            Some(p) if p.role == Role::Backend => Ok(project_target(p)),
            _ => Err(DispatchError::UnsupportedInContext {
                action: action.name(),
                position: context.position(),
                detail: "database operations are backend-owned; run from the backend project"
                    .to_string(),
            }),
        },
    }
}

/// Resolve concrete parameters for an admitted action.
fn resolve_params(
    action: &Action,
    context: &ProjectContext,
    target: &PlanTarget,
    config: &DhConfig,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let dev = config.dev();

    match action {
        Action::Setup => {}

        Action::Validate(opts) => {
            params.insert(
                "mode".to_string(),
                if opts.deploy { "deploy" } else { "standard" }.to_string(),
            );
        }

        Action::Install => {
            if let Some(fe) = context.unique_with_role(Role::Frontend) {
                params.insert("frontend.cwd".to_string(), fe.path.display().to_string());
                params.insert("frontend.command".to_string(), "npm install".to_string());
            }
            if let Some(be) = context.unique_with_role(Role::Backend) {
                params.insert("backend.cwd".to_string(), be.path.display().to_string());
                params.insert("backend.command".to_string(), "uv sync --dev".to_string());
            }
        }

        Action::Dev => {
            let (command, port) = match target.role {
                Some(Role::Backend) => (dev.backend_command, dev.backend_port),
                _ => (dev.frontend_command, dev.frontend_port),
            };
            params.insert("command".to_string(), command);
            params.insert("port".to_string(), port.to_string());
        }

        Action::Build(opts) => {
            if opts.docker {
                let name = context
                    .current()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "app".to_string());
                params.insert("kind".to_string(), "docker-image".to_string());
                params.insert(
                    "command".to_string(),
                    format!("docker build -t {} .", name),
                );
            } else {
                let command = match target.role {
                    Some(Role::Backend) => "uv build",
                    _ => "npm run build",
                };
                params.insert("kind".to_string(), "production".to_string());
                params.insert("command".to_string(), command.to_string());
            }
        }

        Action::DbMigrate => {
            let database = config.database();
            params.insert(
                "migrations_dir".to_string(),
                database
                    .migrations_dir
                    .unwrap_or_else(|| "supabase/migrations".to_string()),
            );
            params.insert(
                "command".to_string(),
                database
                    .migrate_command
                    .unwrap_or_else(|| "supabase db push".to_string()),
            );
        }

        Action::DbSyncUsers => {
            let database = config.database();
            params.insert(
                "users_file".to_string(),
                database
                    .users_file
                    .unwrap_or_else(|| "allowed_users.txt".to_string()),
            );
            params.insert(
                "command".to_string(),
                database
                    .sync_users_command
                    .unwrap_or_else(|| "uv run sync-users".to_string()),
            );
        }

        Action::Clean => {
            let artifact_dirs = |p: &ProjectDescriptor| -> Vec<String> {
                let dirs: &[&str] = match p.role {
                    Role::Frontend => &[".next", "dist"],
                    Role::Backend => &["dist", "__pycache__", ".pytest_cache"],
                    Role::Unknown => &[],
                };
                dirs.iter()
                    .map(|d| p.path.join(d).display().to_string())
                    .collect()
            };
            let targets: Vec<String> = match context.current() {
                Some(p) => artifact_dirs(p),
                None => context.projects().iter().flat_map(artifact_dirs).collect(),
            };
            params.insert("targets".to_string(), targets.join(","));
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerConfig;
    use crate::engine::checks::{
        CheckContext, CheckDefinition, CheckExecutionError, CheckFn, CheckScope,
    };
    use crate::engine::health::CheckResult;
    use crate::engine::resolve::resolve;
    use crate::engine::scan::scan;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    fn paired_workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let fe = dir.path().join("hello-world-fe");
        let be = dir.path().join("hello-world-be");
        fs::create_dir(&fe).unwrap();
        fs::create_dir(&be).unwrap();
        touch(&fe.join("package.json"));
        touch(&be.join("pyproject.toml"));
        dir
    }

    fn context_at(root: &Path, cwd: &Path) -> ProjectContext {
        let map = scan(root, &MarkerConfig::default()).unwrap();
        resolve(cwd, &map).unwrap()
    }

    fn fixed(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
        let _ = ctx;
        Ok(CheckResult::pass("fixed", "ok"))
    }

    fn warning(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
        let _ = ctx;
        Ok(CheckResult::warn("warning", "meh"))
    }

    fn failing(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
        let _ = ctx;
        Ok(CheckResult::fail("failing", "broken"))
    }

    fn registry_of(run: CheckFn, name: &'static str) -> CheckRegistry {
        const BOTH: &[Role] = &[Role::Frontend, Role::Backend];
        const ALL_MODES: &[CheckMode] = &[CheckMode::Standard, CheckMode::Deploy];
        CheckRegistry::from_checks(vec![CheckDefinition {
            name,
            roles: BOTH,
            modes: ALL_MODES,
            scope: CheckScope::Workspace,
            run,
        }])
    }

    fn passing_registry() -> CheckRegistry {
        registry_of(fixed, "fixed")
    }

    fn warn_registry() -> CheckRegistry {
        registry_of(warning, "warning")
    }

    fn fail_registry() -> CheckRegistry {
        registry_of(failing, "failing")
    }

    mod role_validity {
        use super::*;

        #[test]
        fn db_migrate_rejected_from_frontend() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));

            let err = dispatch(
                &Action::DbMigrate,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, DispatchError::UnsupportedInContext { .. }));
        }

        #[test]
        fn db_sync_users_rejected_from_workspace_root() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), dir.path());

            let err = dispatch(
                &Action::DbSyncUsers,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, DispatchError::UnsupportedInContext { .. }));
        }

        #[test]
        fn db_migrate_allowed_from_backend() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-be"));

            let plan = dispatch(
                &Action::DbMigrate,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            assert_eq!(plan.action, "db migrate");
            assert_eq!(plan.param("migrations_dir"), Some("supabase/migrations"));
        }

        #[test]
        fn dev_rejected_from_workspace_root() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), dir.path());

            let err = dispatch(
                &Action::Dev,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap_err();
            let DispatchError::UnsupportedInContext { position, .. } = err else {
                panic!("expected unsupported");
            };
            assert_eq!(position, "workspace root");
        }

        #[test]
        fn install_rejected_with_no_projects() {
            let dir = TempDir::new().unwrap();
            let ctx = context_at(dir.path(), dir.path());

            let err = dispatch(
                &Action::Install,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, DispatchError::UnsupportedInContext { .. }));
        }

        #[test]
        fn install_carries_both_role_commands() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), dir.path());

            let plan = dispatch(
                &Action::Install,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            assert_eq!(plan.param("frontend.command"), Some("npm install"));
            assert_eq!(plan.param("backend.command"), Some("uv sync --dev"));
        }
    }

    mod gating {
        use super::*;

        #[test]
        fn dev_plan_from_healthy_frontend() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));

            let plan = dispatch(
                &Action::Dev,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            assert_eq!(plan.action, "dev");
            assert_eq!(plan.target.role, Some(Role::Frontend));
            assert_eq!(plan.param("command"), Some("npm run dev"));
            assert_eq!(plan.param("port"), Some("3000"));
        }

        #[test]
        fn dev_tolerates_warnings() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));

            assert!(dispatch(&Action::Dev, &ctx, &warn_registry(), &DhConfig::default()).is_ok());
        }

        #[test]
        fn dev_blocked_by_failures() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));

            let err = dispatch(&Action::Dev, &ctx, &fail_registry(), &DhConfig::default())
                .unwrap_err();
            let DispatchError::HealthGateFailed { action, block } = err else {
                panic!("expected gate failure");
            };
            assert_eq!(action, "dev");
            assert_eq!(block.blocking.len(), 1);
        }

        #[test]
        fn db_migrate_blocked_by_warnings() {
            // Pass-only gate: warnings are enough to block database actions.
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-be"));

            let err = dispatch(
                &Action::DbMigrate,
                &ctx,
                &warn_registry(),
                &DhConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, DispatchError::HealthGateFailed { .. }));
        }

        #[test]
        fn validate_is_ungated() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));

            let plan = dispatch(
                &Action::Validate(ValidateOptions { deploy: true }),
                &ctx,
                &fail_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            assert_eq!(plan.param("mode"), Some("deploy"));
        }

        #[test]
        fn clean_is_ungated() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-be"));

            let plan = dispatch(
                &Action::Clean,
                &ctx,
                &fail_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            assert!(plan.param("targets").unwrap().contains("__pycache__"));
        }
    }

    mod plans {
        use super::*;

        #[test]
        fn build_docker_flag_switches_artifact_kind() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));
            let config = DhConfig::default();

            let plain = dispatch(
                &Action::Build(BuildOptions { docker: false }),
                &ctx,
                &passing_registry(),
                &config,
            )
            .unwrap();
            let docker = dispatch(
                &Action::Build(BuildOptions { docker: true }),
                &ctx,
                &passing_registry(),
                &config,
            )
            .unwrap();

            assert_eq!(plain.param("kind"), Some("production"));
            assert_eq!(docker.param("kind"), Some("docker-image"));
            // Same gate either way
            assert_eq!(plain.gate, docker.gate);
        }

        #[test]
        fn backend_dev_uses_backend_runner() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-be"));

            let plan = dispatch(
                &Action::Dev,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            assert_eq!(plan.param("port"), Some("8000"));
            assert!(plan.param("command").unwrap().contains("uvicorn"));
        }

        #[test]
        fn dispatch_is_deterministic() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), &dir.path().join("hello-world-fe"));
            let config = DhConfig::default();
            let registry = passing_registry();

            let first = dispatch(&Action::Dev, &ctx, &registry, &config).unwrap();
            let second = dispatch(&Action::Dev, &ctx, &registry, &config).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn clean_from_root_covers_both_projects() {
            let dir = paired_workspace();
            let ctx = context_at(dir.path(), dir.path());

            let plan = dispatch(
                &Action::Clean,
                &ctx,
                &passing_registry(),
                &DhConfig::default(),
            )
            .unwrap();
            let targets = plan.param("targets").unwrap();
            assert!(targets.contains(".next"));
            assert!(targets.contains("__pycache__"));
        }
    }
}
