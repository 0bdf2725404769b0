//! Structural validation of a raw state document.
//!
//! Runs on the untyped JSON so that every broken rule is reported at once,
//! rather than stopping at the first serde error.

use crate::error::{Result, StateError, ValidationError};
use crate::step::WorkflowStep;
use gearshift_common_core::{Route, Timestamp};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Keys rejected anywhere they are checked.
pub const FORBIDDEN_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Validate a parsed state document.
///
/// Forbidden keys fail fast with [`StateError::PrototypePollution`]; all
/// other problems are collected into one [`ValidationError`].
pub fn validate_value(value: &Value) -> Result<()> {
    let Some(root) = value.as_object() else {
        return Err(ValidationError {
            violations: vec!["state must be a JSON object".to_string()],
        }
        .into());
    };

    check_forbidden_keys(root)?;

    let mut violations = Vec::new();

    require_string(root, "version", &mut violations);
    for key in ["created", "updated"] {
        match root.get(key) {
            Some(Value::String(s)) if Timestamp::parse(s).is_some() => {}
            Some(Value::String(s)) => {
                violations.push(format!("{key} is not an RFC 3339 timestamp: {s:?}"))
            }
            _ => violations.push(format!("{key} must be a timestamp string")),
        }
    }

    match root.get("route") {
        Some(Value::Null) => {}
        Some(Value::String(s)) if is_route(s) => {}
        Some(other) => violations.push(format!(
            "route must be \"greenfield\", \"brownfield\" or null, got {other}"
        )),
        None => violations.push("route is missing".to_string()),
    }

    let current = match root.get("currentStep") {
        Some(Value::Null) => Some(None),
        Some(Value::String(s)) => match s.parse::<WorkflowStep>() {
            Ok(step) => Some(Some(step)),
            Err(_) => {
                violations.push(format!("currentStep is not a known step: {s:?}"));
                None
            }
        },
        Some(other) => {
            violations.push(format!("currentStep must be a step id or null, got {other}"));
            None
        }
        None => {
            violations.push("currentStep is missing".to_string());
            None
        }
    };

    let completed = completed_steps(root.get("completedSteps"), &mut violations);

    // Ordering is only meaningful once both sides parsed.
    if let (Some(current), Some(completed)) = (current, completed) {
        match current {
            Some(current) => {
                for step in completed.iter().filter(|s| **s >= current) {
                    violations.push(format!(
                        "completed step {step} does not precede currentStep {current}"
                    ));
                }
            }
            None if !completed.contains(&WorkflowStep::last()) => violations.push(format!(
                "currentStep is null but {} is not completed",
                WorkflowStep::last()
            )),
            None => {}
        }
    }

    match root.get("metadata") {
        Some(Value::Object(meta)) => {
            for key in ["projectName", "projectPath"] {
                if !matches!(meta.get(key), Some(Value::String(_))) {
                    violations.push(format!("metadata.{key} must be a string"));
                }
            }
        }
        _ => violations.push("metadata must be an object".to_string()),
    }

    match root.get("stepDetails") {
        Some(Value::Object(details)) => {
            for (key, entry) in details {
                if key.parse::<WorkflowStep>().is_err() {
                    violations.push(format!("stepDetails has unknown step {key:?}"));
                }
                match entry {
                    Value::Object(record) => check_step_record(key, record, &mut violations),
                    _ => violations.push(format!("stepDetails.{key} must be an object")),
                }
            }
        }
        _ => violations.push("stepDetails must be an object".to_string()),
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations }.into())
    }
}

fn check_forbidden_keys(root: &Map<String, Value>) -> Result<()> {
    reject_forbidden(root, "")?;
    for nested in ["metadata", "stepDetails"] {
        if let Some(obj) = root.get(nested).and_then(Value::as_object) {
            reject_forbidden(obj, nested)?;
        }
    }
    if let Some(details) = root.get("stepDetails").and_then(Value::as_object) {
        for (step, entry) in details {
            if let Some(record) = entry.as_object() {
                reject_forbidden(record, &format!("stepDetails.{step}"))?;
            }
        }
    }
    Ok(())
}

fn reject_forbidden(obj: &Map<String, Value>, prefix: &str) -> Result<()> {
    match FORBIDDEN_KEYS.iter().find(|k| obj.contains_key(**k)) {
        Some(key) if prefix.is_empty() => Err(StateError::PrototypePollution {
            key: (*key).to_string(),
        }),
        Some(key) => Err(StateError::PrototypePollution {
            key: format!("{prefix}.{key}"),
        }),
        None => Ok(()),
    }
}

fn require_string(obj: &Map<String, Value>, key: &str, violations: &mut Vec<String>) {
    if !matches!(obj.get(key), Some(Value::String(_))) {
        violations.push(format!("{key} must be a string"));
    }
}

fn is_route(s: &str) -> bool {
    [Route::Greenfield, Route::Brownfield]
        .iter()
        .any(|r| r.as_str() == s)
}

fn completed_steps(value: Option<&Value>, violations: &mut Vec<String>) -> Option<Vec<WorkflowStep>> {
    let Some(Value::Array(items)) = value else {
        violations.push("completedSteps must be an array".to_string());
        return None;
    };

    let before = violations.len();
    let mut seen = HashSet::new();
    let mut steps = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str().map(str::parse::<WorkflowStep>) {
            Some(Ok(step)) => {
                if !seen.insert(step) {
                    violations.push(format!("completedSteps lists {step} more than once"));
                }
                steps.push(step);
            }
            _ => violations.push(format!("completedSteps has unknown step {item}")),
        }
    }
    (violations.len() == before).then_some(steps)
}

fn check_step_record(step: &str, record: &Map<String, Value>, violations: &mut Vec<String>) {
    for key in ["started", "completed"] {
        match record.get(key) {
            None => {}
            Some(Value::String(s)) if Timestamp::parse(s).is_some() => {}
            Some(_) => violations.push(format!("stepDetails.{step}.{key} must be a timestamp")),
        }
    }
    match record.get("outputs") {
        None => {}
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
        Some(_) => violations.push(format!("stepDetails.{step}.outputs must be a list of strings")),
    }
    if !matches!(record.get("notes"), None | Some(Value::String(_))) {
        violations.push(format!("stepDetails.{step}.notes must be a string"));
    }
}
