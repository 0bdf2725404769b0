//! Configuration types.

use gearshift_common_core::Route;
use gearshift_common_fs::policy::DEFAULT_DENIED_PREFIXES;
use gearshift_common_fs::OutputPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const MIB: u64 = 1024 * 1024;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearshiftConfig {
    /// Size and nesting ceilings.
    pub limits: LimitsConfig,
    /// Workflow state store settings.
    pub workflow: WorkflowConfig,
    /// Artifact output settings.
    pub output: OutputConfig,
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest state file accepted by `load`.
    pub max_state_file_bytes: u64,
    /// Largest input document read from disk.
    pub max_read_file_bytes: u64,
    /// Deepest `#if`/`#each` nesting a template may use.
    pub max_template_depth: usize,
    /// Largest rendered template.
    pub max_template_output_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_state_file_bytes: 10 * MIB,
            max_read_file_bytes: 10 * MIB,
            max_template_depth: 64,
            max_template_output_bytes: 10 * MIB as usize,
        }
    }
}

/// Workflow state settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// State file name, relative to the project directory.
    pub state_file: String,
    /// Route used by `initialize` when the caller gives none.
    pub default_route: Option<Route>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            state_file: ".gearshift-state.json".to_string(),
            default_route: None,
        }
    }
}

/// Output settings for generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extensions (without dot) artifacts may be written with.
    pub allowed_extensions: Vec<String>,
    /// Absolute directories artifacts may never be written under.
    pub denied_prefixes: Vec<String>,
    /// Output directory, relative to the project directory.
    pub output_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["md".to_string()],
            denied_prefixes: DEFAULT_DENIED_PREFIXES.iter().map(|p| p.to_string()).collect(),
            output_dir: "specs".to_string(),
        }
    }
}

impl OutputConfig {
    /// Build the write policy these settings describe.
    pub fn policy(&self) -> OutputPolicy {
        OutputPolicy::from(self)
    }
}

impl From<&OutputConfig> for OutputPolicy {
    fn from(config: &OutputConfig) -> Self {
        OutputPolicy::new(
            config.allowed_extensions.clone(),
            config.denied_prefixes.iter().map(PathBuf::from).collect(),
        )
    }
}
