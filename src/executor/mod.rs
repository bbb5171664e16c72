//! executor
//!
//! The boundary between deciding and doing.
//!
//! # Design
//!
//! The engine emits an [`ActionPlan`](crate::engine::ActionPlan); an
//! implementation of [`PlanExecutor`] carries it out. Process spawning,
//! Docker builds, migration running, and artifact deletion all live behind
//! this seam, so the engine stays a pure decision procedure and tests can
//! substitute [`mock::MockExecutor`].

pub mod mock;
pub mod process;

pub use mock::MockExecutor;
pub use process::ProcessExecutor;

use thiserror::Error;

use crate::engine::ActionPlan;

/// Errors from plan execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The plan is missing a parameter the executor needs.
    #[error("plan for '{action}' is missing parameter '{param}'")]
    MissingParam {
        /// The plan's action name.
        action: &'static str,
        /// The absent parameter.
        param: &'static str,
    },

    /// Spawning or waiting on a delegated process failed.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// The command line that failed.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Filesystem cleanup failed.
    #[error("failed to remove '{path}': {source}")]
    Remove {
        /// The path that could not be removed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Outcome of executing a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOutcome {
    /// Exit code to propagate (0 on success).
    pub exit_code: i32,
    /// Human summary of what ran.
    pub summary: String,
}

impl ExecuteOutcome {
    /// A successful outcome with a summary.
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            summary: summary.into(),
        }
    }

    /// Whether execution succeeded.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The uniform execution capability consumed by command handlers.
pub trait PlanExecutor {
    /// Execute a plan, returning the outcome.
    ///
    /// Implementations propagate the delegated process's exit code through
    /// the outcome rather than failing, so the CLI can mirror it.
    fn execute(&self, plan: &ActionPlan) -> Result<ExecuteOutcome, ExecuteError>;
}
