use gearshift_common_fs::FsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Every rule a state document broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid workflow state: {}", self.violations.join("; "))
    }
}

/// Workflow state failures.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reserved object key that is rejected outright.
    #[error("state file rejected: forbidden key {key}")]
    PrototypePollution { key: String },

    #[error("state file too large: {size} bytes (max: {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("no workflow state at {}; run initialize first", path.display())]
    NotInitialized { path: PathBuf },

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Fs(FsError),

    #[error("unknown workflow step: {0}")]
    UnknownStep(String),
}

impl From<FsError> for StateError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::TooLarge { size, limit, .. } => Self::TooLarge { size, limit },
            FsError::NotFound { path } => Self::NotInitialized { path },
            other => Self::Fs(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
