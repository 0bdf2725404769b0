//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::types::GearshiftConfig;
use gearshift_common_fs::{self as fs, path, FsError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file name inside the `.gearshift` directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Config files beyond this are rejected before parsing.
const MAX_CONFIG_BYTES: u64 = 1024 * 1024;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("Invalid regex pattern"));

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Fs(#[from] FsError),

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader for one project directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a loader for the nearest project root above `start`, or `start` itself.
    pub fn discover(start: impl AsRef<Path>) -> Self {
        let start = start.as_ref();
        Self::new(path::find_project_root(start).unwrap_or_else(|| start.to_path_buf()))
    }

    /// Project directory this loader reads from.
    pub fn project_dir(&self) -> &Path {
        &self.base_path
    }

    /// Path of the config file: `GEARSHIFT_CONFIG_PATH` if set, else `.gearshift/config.yaml`.
    pub fn config_path(&self) -> PathBuf {
        match Environment::get(vars::GEARSHIFT_CONFIG_PATH) {
            Some(p) => self.base_path.join(p),
            None => path::config_dir(&self.base_path).join(CONFIG_FILE_NAME),
        }
    }

    /// Load configuration, falling back to defaults when no file exists.
    pub fn load(&self) -> Result<GearshiftConfig, ConfigError> {
        let config_path = self.config_path();

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path, MAX_CONFIG_BYTES)?;
            let expanded = self.expand_env_vars(&contents)?;
            debug!(path = %config_path.display(), "loading config");

            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        } else {
            debug!(path = %config_path.display(), "no config file, using defaults");
            GearshiftConfig::default()
        };

        Self::apply_env_overrides(&mut config);
        self.validate(&config)?;
        Ok(config)
    }

    /// Apply per-field environment overrides.
    fn apply_env_overrides(config: &mut GearshiftConfig) {
        if let Some(state_file) = Environment::get(vars::GEARSHIFT_STATE_FILE) {
            config.workflow.state_file = state_file;
        }
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut missing = None;
        let expanded = ENV_VAR.replace_all(content, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match (std::env::var(var_name), cap.get(2)) {
                (Ok(v), _) => v,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarNotFound { var }),
            None => Ok(expanded.into_owned()),
        }
    }

    /// Validate configuration values.
    fn validate(&self, config: &GearshiftConfig) -> Result<(), ConfigError> {
        let limits = &config.limits;
        let checks = [
            (limits.max_state_file_bytes == 0, "limits.max_state_file_bytes must be greater than 0"),
            (limits.max_read_file_bytes == 0, "limits.max_read_file_bytes must be greater than 0"),
            (limits.max_template_depth == 0, "limits.max_template_depth must be greater than 0"),
            (
                limits.max_template_output_bytes == 0,
                "limits.max_template_output_bytes must be greater than 0",
            ),
            (config.workflow.state_file.trim().is_empty(), "workflow.state_file must not be empty"),
            (
                config.output.allowed_extensions.is_empty(),
                "output.allowed_extensions must list at least one extension",
            ),
        ];

        if let Some((_, message)) = checks.iter().find(|(failed, _)| *failed) {
            return Err(ConfigError::ValidationError {
                message: message.to_string(),
            });
        }

        if let Some(prefix) = config
            .output
            .denied_prefixes
            .iter()
            .find(|p| !Path::new(p).is_absolute())
        {
            return Err(ConfigError::ValidationError {
                message: format!("output.denied_prefixes entry {} must be absolute", prefix),
            });
        }

        Ok(())
    }

    /// Save configuration atomically.
    pub fn save(&self, config: &GearshiftConfig) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        fs::write_string_atomic(self.config_path(), &yaml)?;
        Ok(())
    }
}
