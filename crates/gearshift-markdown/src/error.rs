use gearshift_common_fs::FsError;
use thiserror::Error;

/// Malformed block structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A code fence opened on `line` (1-based) was never closed.
    #[error("unterminated code fence opened at line {line}")]
    UnterminatedCodeFence { line: usize },
}

impl ParseError {
    /// Source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            Self::UnterminatedCodeFence { line } => *line,
        }
    }
}

/// Failure loading a document from disk.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fs(#[from] FsError),
}
