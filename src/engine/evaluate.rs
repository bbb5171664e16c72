//! engine::evaluate
//!
//! The health evaluator: run the applicable checks, aggregate a report.
//!
//! # Architecture
//!
//! Evaluation selects checks from the registry by the context's role and the
//! requested mode, executes them independently in registry order, and
//! aggregates the results into a [`HealthReport`]. An unexpected failure
//! inside one check (I/O error from an external call) is caught and
//! converted into a `fail` result carrying the check name and error detail;
//! one check's failure never aborts the batch.
//!
//! From a project directory, project-scoped checks target the current
//! project. From the workspace root, they target every mapped project
//! (frontends before backends, path order within a role), so `dh validate`
//! from the root covers the whole workspace. Workspace-scoped checks run
//! once per evaluation regardless of position.
//!
//! Evaluation is deterministic: identical filesystem/environment state
//! yields a byte-identical report, which is why reports are recomputed
//! fresh every run instead of cached.

use super::checks::{CheckContext, CheckMode, CheckRegistry, CheckScope};
use super::health::{CheckResult, HealthReport};
use super::resolve::ProjectContext;
use super::scan::{ProjectDescriptor, Role};
use crate::config::DhConfig;

/// Run the applicable subset of checks for a context and mode.
pub fn evaluate(
    registry: &CheckRegistry,
    context: &ProjectContext,
    mode: CheckMode,
    config: &DhConfig,
) -> HealthReport {
    let targets = select_targets(context);
    let mut report = HealthReport::new();

    for check in registry.iter() {
        if !check.applies_in_mode(mode) {
            continue;
        }

        match check.scope {
            CheckScope::Workspace => {
                let ctx = CheckContext {
                    context,
                    project: None,
                    config,
                };
                report.push(run_contained(check.name, || check.run(&ctx)));
            }
            CheckScope::Project => {
                for target in targets.iter().filter(|t| check.applies_to_role(t.role)) {
                    let ctx = CheckContext {
                        context,
                        project: Some(target),
                        config,
                    };
                    report.push(run_contained(check.name, || check.run(&ctx)));
                }
            }
        }
    }

    report
}

/// Projects that project-scoped checks run against.
///
/// Inside a project: just that project. At the workspace root: every
/// mapped project, frontends first.
fn select_targets(context: &ProjectContext) -> Vec<&ProjectDescriptor> {
    match context.current() {
        Some(current) => vec![current],
        None => {
            let mut targets: Vec<&ProjectDescriptor> = Vec::new();
            for role in [Role::Frontend, Role::Backend] {
                targets.extend(context.projects().iter().filter(|p| p.role == role));
            }
            targets
        }
    }
}

fn run_contained(
    name: &str,
    run: impl FnOnce() -> Result<CheckResult, super::checks::CheckExecutionError>,
) -> CheckResult {
    match run() {
        Ok(result) => result,
        Err(err) => CheckResult::fail(name, format!("check execution failed: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerConfig;
    use crate::engine::checks::{CheckDefinition, CheckExecutionError};
    use crate::engine::health::CheckStatus;
    use crate::engine::resolve::resolve;
    use crate::engine::scan::scan;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    fn paired_workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let fe = dir.path().join("app-fe");
        let be = dir.path().join("app-be");
        fs::create_dir(&fe).unwrap();
        fs::create_dir(&be).unwrap();
        touch(&fe.join("package.json"));
        touch(&be.join("pyproject.toml"));
        dir
    }

    fn context_for(dir: &Path, cwd: &Path) -> ProjectContext {
        let map = scan(dir, &MarkerConfig::default()).unwrap();
        resolve(cwd, &map).unwrap()
    }

    fn passing(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
        let _ = ctx;
        Ok(CheckResult::pass("always-pass", "ok"))
    }

    fn erroring(ctx: &CheckContext) -> Result<CheckResult, CheckExecutionError> {
        let _ = ctx;
        Err(CheckExecutionError::Io(std::io::Error::other("disk fell off")))
    }

    fn tiny_registry() -> CheckRegistry {
        const BOTH: &[Role] = &[Role::Frontend, Role::Backend];
        const ALL_MODES: &[CheckMode] = &[CheckMode::Standard, CheckMode::Deploy];
        CheckRegistry::from_checks(vec![
            CheckDefinition {
                name: "always-pass",
                roles: BOTH,
                modes: ALL_MODES,
                scope: CheckScope::Workspace,
                run: passing,
            },
            CheckDefinition {
                name: "always-errors",
                roles: BOTH,
                modes: ALL_MODES,
                scope: CheckScope::Workspace,
                run: erroring,
            },
        ])
    }

    mod selection {
        use super::*;

        #[test]
        fn deploy_is_superset_of_standard_for_frontend() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-fe"));
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let standard: HashSet<String> = evaluate(&registry, &ctx, CheckMode::Standard, &config)
                .check_names()
                .iter()
                .map(|s| s.to_string())
                .collect();
            let deploy: HashSet<String> = evaluate(&registry, &ctx, CheckMode::Deploy, &config)
                .check_names()
                .iter()
                .map(|s| s.to_string())
                .collect();

            assert!(standard.is_subset(&deploy));
            assert!(deploy.len() > standard.len());
        }

        #[test]
        fn deploy_is_superset_of_standard_for_backend() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-be"));
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let standard: HashSet<String> = evaluate(&registry, &ctx, CheckMode::Standard, &config)
                .check_names()
                .iter()
                .map(|s| s.to_string())
                .collect();
            let deploy: HashSet<String> = evaluate(&registry, &ctx, CheckMode::Deploy, &config)
                .check_names()
                .iter()
                .map(|s| s.to_string())
                .collect();

            assert!(standard.is_subset(&deploy));
        }

        #[test]
        fn frontend_context_excludes_backend_checks() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-fe"));
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let report = evaluate(&registry, &ctx, CheckMode::Standard, &config);
            assert!(!report.check_names().contains(&"backend-manifest"));
            assert!(report.check_names().contains(&"frontend-manifest"));
        }

        #[test]
        fn workspace_root_covers_both_projects() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), dir.path());
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let report = evaluate(&registry, &ctx, CheckMode::Standard, &config);
            assert!(report.check_names().contains(&"frontend-manifest"));
            assert!(report.check_names().contains(&"backend-manifest"));
        }

        #[test]
        fn workspace_scoped_checks_run_once_from_root() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), dir.path());
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let report = evaluate(&registry, &ctx, CheckMode::Standard, &config);
            let docker_results = report
                .check_names()
                .iter()
                .filter(|n| **n == "docker-available")
                .count();
            assert_eq!(docker_results, 1);
        }
    }

    mod containment {
        use super::*;

        #[test]
        fn check_error_becomes_fail_result() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-fe"));
            let config = DhConfig::default();

            let report = evaluate(&tiny_registry(), &ctx, CheckMode::Standard, &config);
            assert_eq!(report.len(), 2);
            let errored = &report.results()[1];
            assert_eq!(errored.status, CheckStatus::Fail);
            assert_eq!(errored.check, "always-errors");
            assert!(errored.message.contains("disk fell off"));
        }

        #[test]
        fn one_failure_does_not_abort_the_batch() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-fe"));
            let config = DhConfig::default();

            let report = evaluate(&tiny_registry(), &ctx, CheckMode::Standard, &config);
            assert_eq!(report.results()[0].status, CheckStatus::Pass);
        }
    }

    mod determinism {
        use super::*;

        #[test]
        fn repeated_evaluation_is_identical() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-be"));
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let first = evaluate(&registry, &ctx, CheckMode::Standard, &config);
            let second = evaluate(&registry, &ctx, CheckMode::Standard, &config);
            assert_eq!(first.results(), second.results());
        }

        #[test]
        fn report_order_matches_registry_order() {
            let dir = paired_workspace();
            let ctx = context_for(dir.path(), &dir.path().join("app-fe"));
            let registry = CheckRegistry::builtin();
            let config = DhConfig::default();

            let report = evaluate(&registry, &ctx, CheckMode::Standard, &config);
            let report_order: Vec<&str> = report.check_names();
            let registry_order: Vec<&str> = registry
                .iter()
                .filter(|c| {
                    c.applies_in_mode(CheckMode::Standard)
                        && (c.scope == CheckScope::Workspace || c.applies_to_role(Role::Frontend))
                })
                .map(|c| c.name)
                .collect();
            assert_eq!(report_order, registry_order);
        }
    }
}
