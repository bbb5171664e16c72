//! engine::resolve
//!
//! Context resolution: which project does the current directory belong to?
//!
//! # Architecture
//!
//! Given a scanned [`WorkspaceMap`] and the current working directory, the
//! resolver determines the active [`ProjectContext`]: the current project
//! (or the workspace-root position), the paired sibling project if exactly
//! one complementary-role candidate exists, and the workspace root.
//!
//! Sibling ambiguity is never fatal. Zero or multiple candidates of the
//! complementary role leave the sibling absent and attach a warning to the
//! context, so actions that only need the current project still work.
//!
//! # Example
//!
//! ```no_run
//! use devhand::config::MarkerConfig;
//! use devhand::engine::{resolve::resolve, scan::scan};
//! use std::path::Path;
//!
//! let map = scan(Path::new("/ws"), &MarkerConfig::default()).unwrap();
//! let ctx = resolve(Path::new("/ws/hello-world-fe"), &map).unwrap();
//! assert_eq!(ctx.current().unwrap().name, "hello-world-fe");
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::scan::{ProjectDescriptor, Role, WorkspaceMap};

/// Errors from context resolution.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The current directory is neither the workspace root nor inside a
    /// mapped project.
    #[error("'{0}' is not inside a devhand workspace")]
    OutsideWorkspace(PathBuf),
}

/// The resolved identity of the current invocation.
///
/// Owned by a single CLI invocation and recomputed fresh every run; there
/// is no persisted cache.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
    current: Option<ProjectDescriptor>,
    sibling: Option<ProjectDescriptor>,
    projects: Vec<ProjectDescriptor>,
    warnings: Vec<String>,
}

impl ProjectContext {
    /// The workspace root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current project, or `None` at the workspace root.
    pub fn current(&self) -> Option<&ProjectDescriptor> {
        self.current.as_ref()
    }

    /// The paired sibling project, when exactly one candidate resolved.
    pub fn sibling(&self) -> Option<&ProjectDescriptor> {
        self.sibling.as_ref()
    }

    /// All mapped projects, in path order.
    pub fn projects(&self) -> &[ProjectDescriptor] {
        &self.projects
    }

    /// Warnings attached during resolution (ambiguous or missing sibling)
    /// and carried over from the scan.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether the invocation runs from the workspace root.
    pub fn is_workspace_root(&self) -> bool {
        self.current.is_none()
    }

    /// Role of the current project, if any.
    pub fn current_role(&self) -> Option<Role> {
        self.current.as_ref().map(|p| p.role)
    }

    /// The sole project with the given role, if exactly one exists.
    pub fn unique_with_role(&self, role: Role) -> Option<&ProjectDescriptor> {
        let mut candidates = self.projects.iter().filter(|p| p.role == role);
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Human-readable description of the current position.
    pub fn position(&self) -> String {
        match &self.current {
            Some(p) => format!("{} project '{}'", p.role, p.name),
            None => "workspace root".to_string(),
        }
    }
}

/// Resolve the project context for `current_dir` against a workspace map.
///
/// The workspace root resolves to the root position with no sibling.
/// Any other directory must be a mapped project or a descendant of one
/// (longest-prefix match), otherwise `ContextError::OutsideWorkspace`.
pub fn resolve(current_dir: &Path, map: &WorkspaceMap) -> Result<ProjectContext, ContextError> {
    let mut warnings: Vec<String> = map.warnings().to_vec();
    let projects: Vec<ProjectDescriptor> = map.projects().cloned().collect();

    if current_dir == map.root() {
        return Ok(ProjectContext {
            root: map.root().to_path_buf(),
            current: None,
            sibling: None,
            projects,
            warnings,
        });
    }

    // Longest-prefix match handles nested working directories inside a
    // project; BTreeMap order makes ties impossible (paths are unique).
    let current = map
        .projects()
        .filter(|p| current_dir.starts_with(&p.path))
        .max_by_key(|p| p.path.components().count())
        .cloned()
        .ok_or_else(|| ContextError::OutsideWorkspace(current_dir.to_path_buf()))?;

    let sibling = match current.role.complement() {
        Some(complement) => {
            let candidates: Vec<&ProjectDescriptor> =
                map.with_role(complement).collect();
            match candidates.len() {
                1 => Some(candidates[0].clone()),
                0 => {
                    warnings.push(format!(
                        "no {} sibling found for '{}'",
                        complement, current.name
                    ));
                    None
                }
                n => {
                    warnings.push(format!(
                        "{} candidate {} siblings for '{}'; pairing left unresolved",
                        n, complement, current.name
                    ));
                    None
                }
            }
        }
        None => None,
    };

    Ok(ProjectContext {
        root: map.root().to_path_buf(),
        current: Some(current),
        sibling,
        projects,
        warnings,
    })
}
