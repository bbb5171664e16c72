//! engine::scan
//!
//! Workspace scanning and project classification.
//!
//! # Architecture
//!
//! The scanner enumerates the immediate children of the workspace root and
//! classifies each by the marker files it carries, producing a
//! [`WorkspaceMap`]. Scanning is non-recursive: workspace projects are
//! always direct children of the root, by convention.
//!
//! The scan is a pure read of the filesystem. It never writes, and a child
//! directory that cannot be read (permissions) is skipped and recorded as a
//! warning rather than failing the whole scan.
//!
//! # Classification
//!
//! Marker sets come from [`MarkerConfig`] and default to the conventions of
//! the paired webapp layout: `pyproject.toml`/`main.py` for backend,
//! `package.json`/`next.config.ts` for frontend. Backend markers win when a
//! directory somehow carries both sets.
//!
//! # Example
//!
//! ```no_run
//! use devhand::config::MarkerConfig;
//! use devhand::engine::scan::scan;
//! use std::path::Path;
//!
//! let map = scan(Path::new("/ws"), &MarkerConfig::default()).unwrap();
//! for project in map.projects() {
//!     println!("{} -> {}", project.name, project.role);
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::MarkerConfig;

/// Errors from workspace scanning.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace root does not exist or is not a directory.
    #[error("workspace root '{0}' does not exist or is not a directory")]
    RootNotFound(PathBuf),

    /// Enumerating the root itself failed.
    #[error("failed to read workspace root '{path}': {source}")]
    Io {
        /// The root that failed to enumerate.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// The role a workspace project plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// A frontend project (web client).
    Frontend,
    /// A backend project (API service).
    Backend,
    /// A directory matching neither marker set.
    Unknown,
}

impl Role {
    /// The complementary role for sibling pairing.
    ///
    /// `Unknown` has no complement.
    pub fn complement(&self) -> Option<Role> {
        match self {
            Role::Frontend => Some(Role::Backend),
            Role::Backend => Some(Role::Frontend),
            Role::Unknown => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Frontend => write!(f, "frontend"),
            Role::Backend => write!(f, "backend"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

/// A classified workspace project.
///
/// Produced by the scanner from filesystem inspection; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Absolute path of the project directory.
    pub path: PathBuf,
    /// Classified role.
    pub role: Role,
    /// Declared name (the directory name).
    pub name: String,
    /// Marker files that matched, in marker-config order.
    pub markers: Vec<String>,
}

/// The set of projects found under a workspace root.
///
/// Keyed by path for deterministic iteration. Built once per invocation
/// and immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceMap {
    root: PathBuf,
    projects: BTreeMap<PathBuf, ProjectDescriptor>,
    warnings: Vec<String>,
}

impl WorkspaceMap {
    /// The workspace root this map was scanned from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All classified projects, in path order.
    pub fn projects(&self) -> impl Iterator<Item = &ProjectDescriptor> {
        self.projects.values()
    }

    /// Look up a project by exact path.
    pub fn get(&self, path: &Path) -> Option<&ProjectDescriptor> {
        self.projects.get(path)
    }

    /// Projects with the given role, in path order.
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &ProjectDescriptor> {
        self.projects.values().filter(move |p| p.role == role)
    }

    /// Warnings recorded during the scan (skipped children).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of classified projects.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the scan found no classifiable projects.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Scan a workspace root and classify its immediate children.
///
/// Directories matching neither marker set are excluded from the map.
/// Use [`scan_with_unknown`] when unclassified children matter (e.g. for
/// diagnostics in `dh setup`).
///
/// # Errors
///
/// `WorkspaceError::RootNotFound` if `root` is missing or not a directory;
/// `WorkspaceError::Io` if the root itself cannot be enumerated.
pub fn scan(root: &Path, markers: &MarkerConfig) -> Result<WorkspaceMap, WorkspaceError> {
    scan_inner(root, markers, false)
}

/// Scan, keeping `Unknown` children in the map.
pub fn scan_with_unknown(
    root: &Path,
    markers: &MarkerConfig,
) -> Result<WorkspaceMap, WorkspaceError> {
    scan_inner(root, markers, true)
}

fn scan_inner(
    root: &Path,
    markers: &MarkerConfig,
    include_unknown: bool,
) -> Result<WorkspaceMap, WorkspaceError> {
    if !root.is_dir() {
        return Err(WorkspaceError::RootNotFound(root.to_path_buf()));
    }

    let entries = fs::read_dir(root).map_err(|source| WorkspaceError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut map = WorkspaceMap {
        root: root.to_path_buf(),
        projects: BTreeMap::new(),
        warnings: Vec::new(),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                map.warnings.push(format!("skipped unreadable entry: {}", err));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let (role, matched) = match classify(&path, markers) {
            Ok(classified) => classified,
            Err(err) => {
                map.warnings
                    .push(format!("skipped '{}': {}", path.display(), err));
                continue;
            }
        };

        if role == Role::Unknown && !include_unknown {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        map.projects.insert(
            path.clone(),
            ProjectDescriptor {
                path,
                role,
                name,
                markers: matched,
            },
        );
    }

    Ok(map)
}

/// Classify a single directory by its marker files.
///
/// Backend wins over frontend when both marker sets match, since backend
/// misclassification is more likely to be benign.
fn classify(dir: &Path, markers: &MarkerConfig) -> io::Result<(Role, Vec<String>)> {
    // Surface permission errors on the directory itself so the caller can
    // record a warning; individual marker stats treat errors as absent.
    fs::read_dir(dir)?;

    let matched_backend: Vec<String> = markers
        .backend
        .iter()
        .filter(|m| dir.join(m).is_file())
        .cloned()
        .collect();
    if !matched_backend.is_empty() {
        return Ok((Role::Backend, matched_backend));
    }

    let matched_frontend: Vec<String> = markers
        .frontend
        .iter()
        .filter(|m| dir.join(m).is_file())
        .cloned()
        .collect();
    if !matched_frontend.is_empty() {
        return Ok((Role::Frontend, matched_frontend));
    }

    Ok((Role::Unknown, Vec::new()))
}
