//! engine
//!
//! Orchestrates the command lifecycle: Scan → Resolve → Evaluate → Dispatch.
//!
//! # Architecture
//!
//! The engine is the central coordinator for all devhand commands:
//!
//! 1. **Scan**: enumerate the workspace root, classify projects by markers
//! 2. **Resolve**: determine the current project and its paired sibling
//! 3. **Evaluate**: run the applicable environment checks (lazily, on demand)
//! 4. **Dispatch**: decide whether the action is legal, emit an [`ActionPlan`]
//!
//! Execution is delegated to [`crate::executor`]; the engine only decides
//! and validates.
//!
//! # Invariants
//!
//! - Actions execute only against a resolved, validated context
//! - Check failures are contained into the report, never propagated
//! - The engine holds no state between invocations; registries are built
//!   once at startup and passed explicitly
//!
//! # Example
//!
//! ```no_run
//! use devhand::engine::{self, checks::CheckRegistry, dispatch::Action};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let invocation = engine::resolve_invocation(&cwd).unwrap();
//! let registry = CheckRegistry::builtin();
//!
//! let plan = engine::dispatch::dispatch(
//!     &Action::Dev,
//!     &invocation.context,
//!     &registry,
//!     &invocation.config,
//! ).unwrap();
//! println!("would run: {:?}", plan.params);
//! ```

pub mod checks;
pub mod dispatch;
pub mod evaluate;
pub mod gate;
pub mod health;
pub mod resolve;
pub mod scan;

// Re-exports for convenience
pub use checks::{CheckContext, CheckDefinition, CheckMode, CheckRegistry, CheckScope};
pub use dispatch::{Action, ActionPlan, BuildOptions, DispatchError, PlanTarget, ValidateOptions};
pub use evaluate::evaluate;
pub use gate::{gate, GateBlock, GateResult, HealthGate};
pub use health::{CheckResult, CheckStatus, HealthReport, ResultId};
pub use resolve::{resolve, ContextError, ProjectContext};
pub use scan::{scan, ProjectDescriptor, Role, WorkspaceError, WorkspaceMap};

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ConfigWarning, DhConfig, MarkerConfig};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command
/// behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    /// The effective working directory.
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Workspace scanning failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Context resolution failed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a command needs after the scan/resolve phase.
#[derive(Debug)]
pub struct ResolvedInvocation {
    /// Merged configuration (user + workspace).
    pub config: DhConfig,
    /// The scanned workspace map.
    pub map: WorkspaceMap,
    /// The resolved project context.
    pub context: ProjectContext,
    /// Warnings from configuration loading.
    pub config_warnings: Vec<ConfigWarning>,
}

/// Locate the workspace root for a working directory.
///
/// Ancestors are tried outermost-first: the first directory that is a
/// classified project of its parent marks that parent as the root. This
/// keeps a project's own classified subdirectories (vendored packages,
/// test fixtures) from shadowing the real workspace. When no ancestor is
/// a project, a directory whose immediate children classify is itself the
/// root.
pub fn locate_workspace(cwd: &Path, markers: &MarkerConfig) -> Result<PathBuf, ContextError> {
    let mut ancestors: Vec<&Path> = cwd.ancestors().collect();
    ancestors.reverse();

    for dir in ancestors {
        let Some(parent) = dir.parent() else {
            continue;
        };
        if let Ok(map) = scan::scan(parent, markers) {
            if map.get(dir).is_some() {
                return Ok(parent.to_path_buf());
            }
        }
    }

    if let Ok(map) = scan::scan(cwd, markers) {
        if !map.is_empty() {
            return Ok(cwd.to_path_buf());
        }
    }

    Err(ContextError::OutsideWorkspace(cwd.to_path_buf()))
}

/// Run the scan/resolve phase for one invocation.
///
/// Configuration is loaded in two passes: user-level markers locate the
/// root, then the workspace `dh.toml` (which may override the markers)
/// drives the final scan.
pub fn resolve_invocation(cwd: &Path) -> Result<ResolvedInvocation, EngineError> {
    let user_pass = DhConfig::load(None)?;
    let root = locate_workspace(cwd, &user_pass.config.markers())?;

    let loaded = DhConfig::load(Some(&root))?;
    let mut config_warnings = loaded.warnings;
    config_warnings.extend(user_pass.warnings);

    let map = scan::scan(&root, &loaded.config.markers())?;
    let context = resolve::resolve(cwd, &map)?;

    Ok(ResolvedInvocation {
        config: loaded.config,
        map,
        context,
        config_warnings,
    })
}
