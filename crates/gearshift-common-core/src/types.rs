//! Common types and helpers for gearshift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Top-level extraction mode.
///
/// `Greenfield` extraction stays technology-agnostic; `Brownfield` extraction
/// is technology-prescriptive and requires a technical stack in the constitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Rebuild from scratch; stack is not prescribed.
    Greenfield,
    /// Keep the existing stack.
    Brownfield,
}

impl Route {
    /// Lowercase name as it appears in state files and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greenfield => "greenfield",
            Self::Brownfield => "brownfield",
        }
    }

    /// Does this route require a technical stack?
    pub fn requires_stack(&self) -> bool {
        matches!(self, Self::Brownfield)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "greenfield" => Ok(Self::Greenfield),
            "brownfield" => Ok(Self::Brownfield),
            other => Err(Error::UnknownRoute(other.to_string())),
        }
    }
}

/// Turn a heading or name into a lowercase, dash-separated slug.
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Zero-padded three-digit sequence id (`1` -> `"001"`).
pub fn sequence_id(n: usize) -> String {
    format!("{:03}", n)
}
