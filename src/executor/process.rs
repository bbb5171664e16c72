//! executor::process
//!
//! The real executor: delegated shell commands and artifact removal.
//!
//! # Design
//!
//! Plans resolve to at most one of three execution shapes:
//!
//! - a single delegated `command` run in the target directory (dev, build,
//!   db migrate, db sync-users)
//! - per-role install commands (install)
//! - a list of artifact paths to remove (clean)
//!
//! Exit codes of delegated processes are propagated through the outcome,
//! never swallowed.

use std::path::Path;
use std::process::Command;

use super::{ExecuteError, ExecuteOutcome, PlanExecutor};
use crate::engine::ActionPlan;

/// Executor that spawns real processes and touches the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create a process executor.
    pub fn new() -> Self {
        Self
    }

    fn run_shell(&self, command: &str, cwd: &Path) -> Result<i32, ExecuteError> {
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .status()
            .map_err(|source| ExecuteError::Spawn {
                command: command.to_string(),
                source,
            })?;
        Ok(status.code().unwrap_or(1))
    }

    fn execute_install(&self, plan: &ActionPlan) -> Result<ExecuteOutcome, ExecuteError> {
        let mut ran = 0usize;
        for role in ["frontend", "backend"] {
            let (Some(command), Some(cwd)) = (
                plan.param(&format!("{}.command", role)),
                plan.param(&format!("{}.cwd", role)),
            ) else {
                continue;
            };
            let code = self.run_shell(command, Path::new(cwd))?;
            if code != 0 {
                return Ok(ExecuteOutcome {
                    exit_code: code,
                    summary: format!("'{}' failed in {}", command, cwd),
                });
            }
            ran += 1;
        }
        Ok(ExecuteOutcome::success(format!(
            "installed dependencies for {} project{}",
            ran,
            if ran == 1 { "" } else { "s" }
        )))
    }

    fn execute_clean(&self, plan: &ActionPlan) -> Result<ExecuteOutcome, ExecuteError> {
        let targets = plan.param("targets").unwrap_or("");
        let mut removed = 0usize;
        for target in targets.split(',').filter(|t| !t.is_empty()) {
            let path = Path::new(target);
            if !path.exists() {
                continue;
            }
            std::fs::remove_dir_all(path).map_err(|source| ExecuteError::Remove {
                path: target.to_string(),
                source,
            })?;
            removed += 1;
        }
        Ok(ExecuteOutcome::success(format!(
            "removed {} artifact director{}",
            removed,
            if removed == 1 { "y" } else { "ies" }
        )))
    }
}

impl PlanExecutor for ProcessExecutor {
    fn execute(&self, plan: &ActionPlan) -> Result<ExecuteOutcome, ExecuteError> {
        match plan.action {
            "install" => self.execute_install(plan),
            "clean" => self.execute_clean(plan),
            _ => match plan.param("command") {
                Some(command) => {
                    let code = self.run_shell(command, &plan.target.path)?;
                    Ok(ExecuteOutcome {
                        exit_code: code,
                        summary: format!("ran '{}'", command),
                    })
                }
                None => Ok(ExecuteOutcome::success("nothing to execute")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::PlanTarget;
    use crate::engine::HealthGate;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn plan(action: &'static str, cwd: &Path, params: BTreeMap<String, String>) -> ActionPlan {
        ActionPlan {
            action,
            target: PlanTarget {
                path: cwd.to_path_buf(),
                role: None,
            },
            params,
            gate: HealthGate::Ungated,
        }
    }

    #[test]
    fn command_exit_code_propagates() {
        let dir = TempDir::new().unwrap();
        let mut params = BTreeMap::new();
        params.insert("command".to_string(), "exit 3".to_string());

        let outcome = ProcessExecutor::new()
            .execute(&plan("dev", dir.path(), params))
            .unwrap();
        assert_eq!(outcome.exit_code, 3);
    }

    #[test]
    fn command_runs_in_target_directory() {
        let dir = TempDir::new().unwrap();
        let mut params = BTreeMap::new();
        params.insert("command".to_string(), "touch ran-here".to_string());

        let outcome = ProcessExecutor::new()
            .execute(&plan("build", dir.path(), params))
            .unwrap();
        assert!(outcome.is_success());
        assert!(dir.path().join("ran-here").exists());
    }

    #[test]
    fn clean_removes_existing_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        let artifacts = dir.path().join(".next");
        std::fs::create_dir(&artifacts).unwrap();
        std::fs::write(artifacts.join("chunk.js"), "x").unwrap();
        let missing = dir.path().join("dist");

        let mut params = BTreeMap::new();
        params.insert(
            "targets".to_string(),
            format!("{},{}", artifacts.display(), missing.display()),
        );

        let outcome = ProcessExecutor::new()
            .execute(&plan("clean", dir.path(), params))
            .unwrap();
        assert!(outcome.is_success());
        assert!(!artifacts.exists());
        assert!(outcome.summary.contains("1 artifact"));
    }

    #[test]
    fn install_runs_each_role_command() {
        let dir = TempDir::new().unwrap();
        let fe = dir.path().join("fe");
        let be = dir.path().join("be");
        std::fs::create_dir(&fe).unwrap();
        std::fs::create_dir(&be).unwrap();

        let mut params = BTreeMap::new();
        params.insert("frontend.cwd".to_string(), fe.display().to_string());
        params.insert("frontend.command".to_string(), "touch fe-ran".to_string());
        params.insert("backend.cwd".to_string(), be.display().to_string());
        params.insert("backend.command".to_string(), "touch be-ran".to_string());

        let outcome = ProcessExecutor::new()
            .execute(&plan("install", dir.path(), params))
            .unwrap();
        assert!(outcome.is_success());
        assert!(fe.join("fe-ran").exists());
        assert!(be.join("be-ran").exists());
    }

    #[test]
    fn install_stops_on_failure() {
        let dir = TempDir::new().unwrap();
        let mut params = BTreeMap::new();
        params.insert("frontend.cwd".to_string(), dir.path().display().to_string());
        params.insert("frontend.command".to_string(), "exit 1".to_string());
        params.insert("backend.cwd".to_string(), dir.path().display().to_string());
        params.insert("backend.command".to_string(), "touch be-ran".to_string());

        let outcome = ProcessExecutor::new()
            .execute(&plan("install", dir.path(), params))
            .unwrap();
        assert_eq!(outcome.exit_code, 1);
        assert!(!dir.path().join("be-ran").exists());
    }

    #[test]
    fn plan_without_command_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let outcome = ProcessExecutor::new()
            .execute(&plan("setup", dir.path(), BTreeMap::new()))
            .unwrap();
        assert!(outcome.is_success());
    }
}
