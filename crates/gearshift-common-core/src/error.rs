//! Error types shared across gearshift crates.

use thiserror::Error;

/// Errors raised by the core value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A route string was neither `greenfield` nor `brownfield`.
    #[error("unknown route '{0}' (expected 'greenfield' or 'brownfield')")]
    UnknownRoute(String),

    /// A timestamp string was not valid RFC 3339.
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Result type alias using the core Error.
pub type Result<T> = std::result::Result<T, Error>;
