//! config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Devhand has two configuration scopes:
//! - **User**: workspace-independent defaults
//! - **Workspace**: per-workspace overrides in `dh.toml`
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. User config file
//! 3. Workspace config file
//! 4. CLI flags (not handled here)
//!
//! # Locations
//!
//! User config is searched in order:
//! 1. `$DH_CONFIG` if set
//! 2. `<config dir>/devhand/config.toml` (canonical write location)
//!
//! Workspace config lives at `<workspace root>/dh.toml`.
//!
//! # Example
//!
//! ```no_run
//! use devhand::config::DhConfig;
//! use std::path::Path;
//!
//! let result = DhConfig::load(Some(Path::new("/path/to/workspace"))).unwrap();
//! let config = result.config;
//!
//! println!("frontend port: {}", config.dev().frontend_port);
//! for marker in &config.markers().backend {
//!     println!("backend marker: {}", marker);
//! }
//! ```

pub mod envfile;
pub mod schema;

pub use schema::{
    DatabaseConfig, DeployConfig, DevConfig, MarkerConfig, UserConfig, WorkspaceConfig,
};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the workspace config file at the workspace root.
pub const WORKSPACE_CONFIG_FILE: &str = "dh.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("config directory not found")]
    NoConfigDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: DhConfig,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules automatically: workspace
/// config overrides user config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct DhConfig {
    /// User configuration.
    pub user: UserConfig,
    /// Workspace configuration (if a workspace root was given).
    pub workspace: Option<WorkspaceConfig>,
    /// Path to the workspace config file (if loaded).
    workspace_path: Option<PathBuf>,
}

impl DhConfig {
    /// Load configuration from default locations.
    ///
    /// A malformed user config file is downgraded to a warning (the
    /// workspace still works with defaults); a malformed workspace
    /// `dh.toml` is an error because it was authored for this workspace.
    pub fn load(workspace_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let user = match user_config_path() {
            Some(path) if path.is_file() => match read_toml::<UserConfig>(&path) {
                Ok(user) => {
                    user.validate()?;
                    user
                }
                Err(err) => {
                    warnings.push(ConfigWarning {
                        message: format!("ignoring unreadable user config: {}", err),
                        path,
                    });
                    UserConfig::default()
                }
            },
            _ => UserConfig::default(),
        };

        let mut config = DhConfig {
            user,
            workspace: None,
            workspace_path: None,
        };

        if let Some(root) = workspace_root {
            let path = root.join(WORKSPACE_CONFIG_FILE);
            if path.is_file() {
                let workspace = read_toml::<WorkspaceConfig>(&path)?;
                workspace.validate()?;
                config.workspace = Some(workspace);
                config.workspace_path = Some(path);
            }
        }

        Ok(ConfigLoadResult { config, warnings })
    }

    /// Markers with precedence applied.
    pub fn markers(&self) -> MarkerConfig {
        self.workspace
            .as_ref()
            .and_then(|w| w.markers.clone())
            .or_else(|| self.user.markers.clone())
            .unwrap_or_default()
    }

    /// Dev settings with precedence applied.
    pub fn dev(&self) -> DevConfig {
        self.workspace
            .as_ref()
            .and_then(|w| w.dev.clone())
            .or_else(|| self.user.dev.clone())
            .unwrap_or_default()
    }

    /// Deploy settings with precedence applied.
    pub fn deploy(&self) -> DeployConfig {
        self.workspace
            .as_ref()
            .and_then(|w| w.deploy.clone())
            .unwrap_or_default()
    }

    /// Database settings (workspace scope only).
    pub fn database(&self) -> DatabaseConfig {
        self.workspace
            .as_ref()
            .and_then(|w| w.database.clone())
            .unwrap_or_default()
    }

    /// Path of the loaded workspace config file, if any.
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace_path.as_deref()
    }

    /// Write the workspace config to `<root>/dh.toml`.
    pub fn save_workspace(root: &Path, workspace: &WorkspaceConfig) -> Result<(), ConfigError> {
        workspace.validate()?;
        let path = root.join(WORKSPACE_CONFIG_FILE);
        let rendered = toml::to_string_pretty(workspace)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        fs::write(&path, rendered).map_err(|source| ConfigError::WriteError { path, source })
    }
}

/// Resolve the user config path.
///
/// `$DH_CONFIG` wins; otherwise the platform config dir is used.
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DH_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("devhand").join("config.toml"))
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
