//! The fixed step sequence.

use crate::error::StateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline steps in execution order. `Ord` follows the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    Analyze,
    ReverseEngineer,
    CreateSpecs,
    GapAnalysis,
    CompleteSpec,
    Implement,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 6] = [
        Self::Analyze,
        Self::ReverseEngineer,
        Self::CreateSpecs,
        Self::GapAnalysis,
        Self::CompleteSpec,
        Self::Implement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::ReverseEngineer => "reverse-engineer",
            Self::CreateSpecs => "create-specs",
            Self::GapAnalysis => "gap-analysis",
            Self::CompleteSpec => "complete-spec",
            Self::Implement => "implement",
        }
    }

    /// Zero-based position in the sequence.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The following step; `None` after `Implement`.
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn first() -> Self {
        Self::Analyze
    }

    pub fn last() -> Self {
        Self::Implement
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStep {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| StateError::UnknownStep(s.to_string()))
    }
}
