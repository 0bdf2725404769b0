//! The persisted workflow state document.

use crate::step::WorkflowStep;
use gearshift_common_core::{Route, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Schema version written into every new state file.
pub const STATE_VERSION: &str = "1.0.0";

/// Project identity recorded at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_name: String,
    pub project_path: String,
}

impl ProjectMetadata {
    pub fn for_dir(dir: &Path) -> Self {
        let project_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            project_name,
            project_path: dir.display().to_string(),
        }
    }
}

/// Per-step record. Unknown keys survive a load/write cycle through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepDetails {
    pub fn with_outputs<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outputs: outputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Overlay `other` onto `self`: set fields win, outputs accumulate.
    pub fn merge(&mut self, other: StepDetails) {
        if other.started.is_some() {
            self.started = other.started;
        }
        if other.completed.is_some() {
            self.completed = other.completed;
        }
        for output in other.outputs {
            if !self.outputs.contains(&output) {
                self.outputs.push(output);
            }
        }
        if other.notes.is_some() {
            self.notes = other.notes;
        }
        self.extra.extend(other.extra);
    }
}

/// The full state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub version: String,
    pub created: Timestamp,
    pub updated: Timestamp,
    pub route: Option<Route>,
    pub current_step: Option<WorkflowStep>,
    pub completed_steps: Vec<WorkflowStep>,
    pub metadata: ProjectMetadata,
    /// Keyed by step id (`"analyze"`, ...).
    pub step_details: BTreeMap<String, StepDetails>,
}

impl WorkflowState {
    /// Fresh state positioned at the first step.
    pub fn new(project_dir: &Path, route: Option<Route>) -> Self {
        let now = Timestamp::now();
        Self {
            version: STATE_VERSION.to_string(),
            created: now,
            updated: now,
            route,
            current_step: Some(WorkflowStep::first()),
            completed_steps: Vec::new(),
            metadata: ProjectMetadata::for_dir(project_dir),
            step_details: BTreeMap::new(),
        }
    }

    pub fn is_completed(&self, step: WorkflowStep) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_finished(&self) -> bool {
        self.current_step.is_none()
    }

    pub fn details(&self, step: WorkflowStep) -> Option<&StepDetails> {
        self.step_details.get(step.as_str())
    }

    pub fn details_mut(&mut self, step: WorkflowStep) -> &mut StepDetails {
        self.step_details
            .entry(step.as_str().to_string())
            .or_default()
    }

    /// Record `step` as done.
    ///
    /// A step is listed at most once. `current_step` only moves forward:
    /// it becomes the step after `step` unless it is already past it.
    pub fn complete_step(&mut self, step: WorkflowStep, details: Option<StepDetails>, at: Timestamp) {
        if !self.is_completed(step) {
            self.completed_steps.push(step);
        }

        if matches!(self.current_step, Some(current) if current <= step) {
            self.current_step = step.next();
        }

        let entry = self.details_mut(step);
        if let Some(details) = details {
            entry.merge(details);
        }
        entry.completed = Some(at);
    }

    /// Stamp the start time of `step`.
    pub fn start_step(&mut self, step: WorkflowStep, at: Timestamp) {
        self.details_mut(step).started = Some(at);
    }

    pub fn progress(&self) -> Progress {
        let total = WorkflowStep::ALL.len();
        let completed = self.completed_steps.len();
        Progress {
            completed,
            total,
            percent: ((completed * 100) / total) as u8,
            current: self.current_step,
        }
    }
}

/// Summary of how far the pipeline has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub current: Option<WorkflowStep>,
}
