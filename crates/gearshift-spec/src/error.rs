//! Error types for specification generation.

use gearshift_common_fs::FsError;
use gearshift_markdown::{DocumentError, ParseError};
use gearshift_template::TemplateError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Stage of the pipeline that rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPhase {
    Constitution,
    Features,
    Plans,
}

impl fmt::Display for ExtractionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constitution => "constitution",
            Self::Features => "features",
            Self::Plans => "plans",
        })
    }
}

/// Which field broke which bound, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    pub field: Option<String>,
    pub bound: Option<String>,
    pub actual: Option<String>,
}

/// A document violated a structural or cardinality contract.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{phase} extraction failed: {message}")]
pub struct ExtractionError {
    pub phase: ExtractionPhase,
    pub message: String,
    pub details: ErrorDetails,
}

impl ExtractionError {
    pub fn new(phase: ExtractionPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            details: ErrorDetails::default(),
        }
    }

    /// A required section heading was not found.
    pub fn missing_section(phase: ExtractionPhase, section: &str) -> Self {
        Self {
            phase,
            message: format!("missing required section \"{section}\""),
            details: ErrorDetails {
                field: Some(section.to_string()),
                ..Default::default()
            },
        }
    }

    /// `field` has `actual` where `bound` was required.
    pub fn out_of_bounds(
        phase: ExtractionPhase,
        field: &str,
        bound: impl Into<String>,
        actual: impl fmt::Display,
    ) -> Self {
        let bound = bound.into();
        let actual = actual.to_string();
        Self {
            phase,
            message: format!("{field} must be {bound}, found {actual}"),
            details: ErrorDetails {
                field: Some(field.to_string()),
                bound: Some(bound),
                actual: Some(actual),
            },
        }
    }
}

/// Any failure while generating specifications.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("failed to parse document: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to render artifact: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Fs(#[from] FsError),
}

impl From<DocumentError> for SpecError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Parse(e) => Self::Parse(e),
            DocumentError::Fs(e) => Self::Fs(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpecError>;
