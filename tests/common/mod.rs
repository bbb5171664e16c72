//! Shared test fixtures.
//!
//! A `TestWorkspace` is a real temporary directory laid out like the
//! paired webapp convention: one frontend and one backend project as
//! direct children of the root.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A real on-disk workspace for integration tests.
pub struct TestWorkspace {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// A workspace with `hello-world-fe` and `hello-world-be`.
    pub fn paired() -> Self {
        let ws = Self::empty();
        ws.add_project("hello-world-fe", "package.json");
        ws.add_project("hello-world-be", "pyproject.toml");
        ws
    }

    /// A workspace with no projects.
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp workspace"),
        }
    }

    /// Workspace root path.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the conventional frontend project.
    pub fn frontend(&self) -> PathBuf {
        self.root().join("hello-world-fe")
    }

    /// Path of the conventional backend project.
    pub fn backend(&self) -> PathBuf {
        self.root().join("hello-world-be")
    }

    /// Add a project directory carrying one marker file.
    pub fn add_project(&self, name: &str, marker: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::create_dir_all(&path).expect("failed to create project dir");
        fs::write(path.join(marker), "").expect("failed to write marker");
        path
    }

    /// Write the workspace `dh.toml`.
    pub fn write_config(&self, contents: &str) {
        fs::write(self.root().join("dh.toml"), contents).expect("failed to write dh.toml");
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write_file(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parents");
        }
        fs::write(path, contents).expect("failed to write file");
    }
}
