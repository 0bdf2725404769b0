//! File system error type.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File I/O errors, split by the causes callers act on differently.
#[derive(Error, Debug)]
pub enum FsError {
    /// Target does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The process may not read or write the target.
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// File is larger than the configured ceiling.
    #[error("file too large: {} is {size} bytes (max: {limit})", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Output path rejected by the write policy.
    #[error("path not allowed: {} ({reason})", path.display())]
    PathNotAllowed { path: PathBuf, reason: String },

    /// Any other I/O failure.
    #[error("{operation} failed for {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an io::Error for the given path.
    pub fn from_io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                operation,
                path,
                source,
            },
        }
    }

    /// Path rejected by policy.
    pub fn not_allowed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PathNotAllowed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Is this a not-found error?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for file system operations.
pub type Result<T> = std::result::Result<T, FsError>;
