//! config::schema
//!
//! Configuration schema types.
//!
//! # Workspace Config
//!
//! Located at `<workspace root>/dh.toml`. Overrides the user config.
//!
//! # User Config
//!
//! Located at (in order of precedence):
//! 1. `$DH_CONFIG` if set
//! 2. `<config dir>/devhand/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., ports must be nonzero, marker lists non-empty).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Workspace-level configuration.
///
/// # Example
///
/// ```toml
/// [markers]
/// frontend = ["package.json", "next.config.ts"]
/// backend = ["pyproject.toml", "main.py"]
///
/// [dev]
/// frontend_port = 3000
/// backend_port = 8000
///
/// [deploy]
/// required_env = ["NEXT_PUBLIC_SUPABASE_URL", "NEXT_PUBLIC_API_URL"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Project classification markers.
    pub markers: Option<MarkerConfig>,

    /// Dev server settings.
    pub dev: Option<DevConfig>,

    /// Deployment validation settings.
    pub deploy: Option<DeployConfig>,

    /// Database settings.
    pub database: Option<DatabaseConfig>,
}

impl WorkspaceConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(markers) = &self.markers {
            markers.validate()?;
        }
        if let Some(dev) = &self.dev {
            dev.validate()?;
        }
        Ok(())
    }
}

/// User-level configuration.
///
/// Holds workspace-independent defaults; every field can be overridden
/// by the workspace config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    /// Default interactive mode.
    pub interactive: Option<bool>,

    /// Project classification markers.
    pub markers: Option<MarkerConfig>,

    /// Dev server settings.
    pub dev: Option<DevConfig>,
}

impl UserConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(markers) = &self.markers {
            markers.validate()?;
        }
        if let Some(dev) = &self.dev {
            dev.validate()?;
        }
        Ok(())
    }
}

/// Marker files used to classify workspace subdirectories.
///
/// A directory is classified backend if any backend marker is present,
/// frontend if any frontend marker is present, and unknown otherwise.
/// Backend markers win when both sets match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerConfig {
    /// Files whose presence marks a frontend project.
    pub frontend: Vec<String>,

    /// Files whose presence marks a backend project.
    pub backend: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            frontend: vec!["package.json".to_string(), "next.config.ts".to_string()],
            backend: vec!["pyproject.toml".to_string(), "main.py".to_string()],
        }
    }
}

impl MarkerConfig {
    /// Validate the marker lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frontend.is_empty() {
            return Err(ConfigError::InvalidValue(
                "markers.frontend cannot be empty".to_string(),
            ));
        }
        if self.backend.is_empty() {
            return Err(ConfigError::InvalidValue(
                "markers.backend cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Dev server settings per role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DevConfig {
    /// Port the frontend dev server binds.
    pub frontend_port: u16,

    /// Port the backend dev server binds.
    pub backend_port: u16,

    /// Frontend dev server command.
    pub frontend_command: String,

    /// Backend dev server command.
    pub backend_command: String,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            frontend_port: 3000,
            backend_port: 8000,
            frontend_command: "npm run dev".to_string(),
            backend_command: "uv run uvicorn main:app --reload".to_string(),
        }
    }
}

impl DevConfig {
    /// Validate the dev settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frontend_port == 0 || self.backend_port == 0 {
            return Err(ConfigError::InvalidValue(
                "dev ports must be nonzero".to_string(),
            ));
        }
        if self.frontend_command.is_empty() || self.backend_command.is_empty() {
            return Err(ConfigError::InvalidValue(
                "dev commands cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deployment validation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Environment variables that must be present in the frontend `.env`
    /// before a deployment is considered configured.
    pub required_env: Vec<String>,

    /// Env var holding the deployed backend API URL.
    pub api_url_var: String,

    /// Seconds before the backend reachability probe gives up.
    pub probe_timeout_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            required_env: vec![
                "NEXT_PUBLIC_SUPABASE_URL".to_string(),
                "NEXT_PUBLIC_SUPABASE_KEY".to_string(),
                "NEXT_PUBLIC_API_URL".to_string(),
            ],
            api_url_var: "NEXT_PUBLIC_API_URL".to_string(),
            probe_timeout_secs: 10,
        }
    }
}

/// Database settings consumed by the database checks and db actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database project URL.
    pub url: Option<String>,

    /// Env var holding the secret key (never stored in dh.toml).
    pub secret_key_var: Option<String>,

    /// Directory of SQL migration files, relative to the backend project.
    pub migrations_dir: Option<String>,

    /// File listing allowed user emails, relative to the backend project.
    pub users_file: Option<String>,

    /// Delegated command that applies migrations.
    pub migrate_command: Option<String>,

    /// Delegated command that syncs allowed users.
    pub sync_users_command: Option<String>,
}
