//! Advisory check for variables the data cannot satisfy.

use crate::render::Lookup;
use crate::token::{tokenize, Token};
use serde::Serialize;
use serde_json::Value;

const RESERVED: [&str; 2] = ["this", "index"];

/// Variables referenced by a template but absent from its data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Missing names in first-occurrence order, each once.
    pub missing: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Report every bare variable that does not resolve against `data`.
///
/// Names inside loop bodies are checked against the top-level data too, so
/// a field supplied only by loop items is reported.
pub fn validate_template(template: &str, data: &Value) -> ValidationReport {
    let lookup = Lookup::new(data);
    let mut missing: Vec<String> = Vec::new();

    for token in tokenize(template) {
        if let Token::Var { name, .. } = token {
            if RESERVED.contains(&name) || missing.iter().any(|m| m == name) {
                continue;
            }
            if lookup.resolve(name).is_none() {
                missing.push(name.to_string());
            }
        }
    }

    ValidationReport { missing }
}
