//! Implementation plans for unfinished features.

use crate::error::{ExtractionError, ExtractionPhase};
use crate::features::{Feature, FeatureStatus};
use crate::status::debt_section_text;
use gearshift_markdown::Document;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

pub const DESIGN_HOURS: u32 = 4;
pub const IMPLEMENTATION_HOURS: u32 = 8;
pub const TESTING_BASE_HOURS: u32 = 4;
pub const TESTING_HOURS_PER_CRITERION: u32 = 1;
pub const DOCUMENTATION_HOURS: u32 = 2;

const HOURS_PER_DAY: u32 = 8;
const HOURS_PER_WEEK: u32 = 40;

const UNKNOWN_CURRENT_STATE: &str =
    "No existing implementation is documented; assume the feature is not started.";

static WHAT_EXISTS_BLOCK: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"what\s+exists:?\s*(.*?)(?:what(?:'|’|\s+i)s\s+missing|$)")
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("Invalid regex pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskCategory {
    Design,
    Implementation,
    Testing,
    Documentation,
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Design => "Design",
            Self::Implementation => "Implementation",
            Self::Testing => "Testing",
            Self::Documentation => "Documentation",
        })
    }
}

/// A unit of planned work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// `T{featureId}-{n}`.
    pub id: String,
    pub description: String,
    pub estimated_hours: u32,
    /// Ids of tasks that must finish first.
    pub dependencies: Vec<String>,
    pub category: TaskCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub description: String,
    pub probability: RiskLevel,
    pub impact: RiskLevel,
    pub mitigation: String,
}

impl Risk {
    /// Present in every plan.
    pub fn complexity() -> Self {
        Self {
            description: "Implementation complexity may exceed estimates".to_string(),
            probability: RiskLevel::Medium,
            impact: RiskLevel::Medium,
            mitigation: "Break work into small increments and review early".to_string(),
        }
    }

    /// Present when the feature declares dependencies.
    pub fn dependencies(deps: &[String]) -> Self {
        Self {
            description: format!("Depends on: {}", deps.join(", ")),
            probability: RiskLevel::Medium,
            impact: RiskLevel::High,
            mitigation: "Verify dependencies are available before starting".to_string(),
        }
    }
}

/// Plan for taking one feature from its current to its target state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationPlan {
    pub feature_id: String,
    pub feature_name: String,
    pub feature_slug: String,
    pub status: FeatureStatus,
    pub current_state: String,
    pub target_state: String,
    pub technical_approach: String,
    pub tasks: Vec<Task>,
    pub risks: Vec<Risk>,
    pub total_hours: u32,
    pub estimated_effort: String,
    pub dependencies: Vec<String>,
}

/// `"{h} hours"`, with a rounded-up week or day figure for larger totals.
pub fn format_effort(hours: u32) -> String {
    if hours > HOURS_PER_WEEK {
        format!("{hours} hours (~{} weeks)", hours.div_ceil(HOURS_PER_WEEK))
    } else if hours > HOURS_PER_DAY {
        format!("{hours} hours (~{} days)", hours.div_ceil(HOURS_PER_DAY))
    } else {
        format!("{hours} hours")
    }
}

/// Plans for every feature not yet `COMPLETE`.
///
/// Feature ids key the output files, so duplicates are rejected.
pub fn generate_plans(
    features: &[Feature],
    debt: Option<&Document>,
) -> Result<Vec<ImplementationPlan>, ExtractionError> {
    let mut seen = HashSet::new();
    if let Some(dup) = features.iter().find(|f| !seen.insert(f.id.as_str())) {
        return Err(ExtractionError::new(
            ExtractionPhase::Plans,
            format!("duplicate feature id {} ({})", dup.id, dup.name),
        ));
    }

    let plans: Vec<ImplementationPlan> = features
        .iter()
        .filter(|f| f.status != FeatureStatus::Complete)
        .map(|f| generate_plan(f, debt))
        .collect();

    info!(
        features = features.len(),
        plans = plans.len(),
        "implementation plans generated"
    );
    Ok(plans)
}

/// Plan for a single feature, regardless of its status.
pub fn generate_plan(feature: &Feature, debt: Option<&Document>) -> ImplementationPlan {
    let tasks = TaskBuilder::new(&feature.id).build(feature);
    let total_hours: u32 = tasks.iter().map(|t| t.estimated_hours).sum();

    let mut risks = vec![Risk::complexity()];
    if !feature.dependencies.is_empty() {
        risks.push(Risk::dependencies(&feature.dependencies));
    }

    debug!(feature = %feature.name, tasks = tasks.len(), total_hours, "plan built");

    ImplementationPlan {
        feature_id: feature.id.clone(),
        feature_name: feature.name.clone(),
        feature_slug: feature.slug.clone(),
        status: feature.status,
        current_state: current_state(feature, debt),
        target_state: target_state(feature),
        technical_approach: technical_approach(feature),
        tasks,
        risks,
        total_hours,
        estimated_effort: format_effort(total_hours),
        dependencies: feature.dependencies.clone(),
    }
}

fn current_state(feature: &Feature, debt: Option<&Document>) -> String {
    let captured = debt
        .and_then(|d| debt_section_text(d, &feature.name))
        .and_then(|body| {
            let caps = WHAT_EXISTS_BLOCK.captures(&body)?;
            let lines: Vec<String> = caps[1]
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| format!("- {l}"))
                .collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        });
    captured.unwrap_or_else(|| UNKNOWN_CURRENT_STATE.to_string())
}

fn target_state(feature: &Feature) -> String {
    let mut parts = Vec::new();
    if !feature.description.is_empty() {
        parts.push(feature.description.clone());
    }
    if !feature.user_stories.is_empty() {
        let stories: Vec<String> = feature
            .user_stories
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s.raw_text))
            .collect();
        parts.push(format!("User stories:\n{}", stories.join("\n")));
    }
    if !feature.acceptance_criteria.is_empty() {
        let criteria: Vec<String> = feature
            .acceptance_criteria
            .iter()
            .map(|c| format!("- {}", c.description))
            .collect();
        parts.push(format!("Acceptance criteria:\n{}", criteria.join("\n")));
    }
    if parts.is_empty() {
        format!("{} is fully implemented.", feature.name)
    } else {
        parts.join("\n\n")
    }
}

fn technical_approach(feature: &Feature) -> String {
    let steps: Vec<String> = match &feature.technical_requirements {
        Some(reqs) => reqs
            .buckets()
            .filter(|(_, items)| !items.is_empty())
            .map(|(label, items)| format!("{}: {}", approach_verb(label), items.join("; ")))
            .collect(),
        None => Vec::new(),
    };

    let steps = if steps.is_empty() {
        vec![
            "Design the feature against the target state".to_string(),
            "Implement it in small, tested increments".to_string(),
            "Verify the result against the acceptance criteria".to_string(),
        ]
    } else {
        steps
    };

    steps
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn approach_verb(bucket: &str) -> &'static str {
    match bucket {
        "Dependency" => "Integrate dependencies",
        "Endpoint" => "Implement API endpoints",
        "Database" => "Apply database changes",
        "Component" => "Build components",
        "File" => "Create or modify files",
        _ => "Address additional requirements",
    }
}

/// Numbers tasks `T{feature}-{n}` in creation order.
struct TaskBuilder<'a> {
    feature_id: &'a str,
    tasks: Vec<Task>,
}

impl<'a> TaskBuilder<'a> {
    fn new(feature_id: &'a str) -> Self {
        Self {
            feature_id,
            tasks: Vec::new(),
        }
    }

    fn push(
        &mut self,
        category: TaskCategory,
        description: String,
        hours: u32,
        dependencies: Vec<String>,
    ) -> String {
        let id = format!("T{}-{}", self.feature_id, self.tasks.len() + 1);
        self.tasks.push(Task {
            id: id.clone(),
            description,
            estimated_hours: hours,
            dependencies,
            category,
        });
        id
    }

    /// Design, then one implementation task per story, then testing, then docs.
    fn build(mut self, feature: &Feature) -> Vec<Task> {
        let design = self.push(
            TaskCategory::Design,
            format!("Design {}", feature.name),
            DESIGN_HOURS,
            Vec::new(),
        );

        let implementation: Vec<String> = if feature.user_stories.is_empty() {
            vec![self.push(
                TaskCategory::Implementation,
                format!("Implement {}", feature.name),
                IMPLEMENTATION_HOURS,
                vec![design.clone()],
            )]
        } else {
            feature
                .user_stories
                .iter()
                .map(|story| {
                    self.push(
                        TaskCategory::Implementation,
                        format!("Implement: {}", story.raw_text),
                        IMPLEMENTATION_HOURS,
                        vec![design.clone()],
                    )
                })
                .collect()
        };

        let criteria = feature.acceptance_criteria.len() as u32;
        let testing = self.push(
            TaskCategory::Testing,
            format!("Write tests for {}", feature.name),
            TESTING_BASE_HOURS + TESTING_HOURS_PER_CRITERION * criteria,
            implementation.clone(),
        );

        let mut everything = vec![design];
        everything.extend(implementation);
        everything.push(testing);
        self.push(
            TaskCategory::Documentation,
            format!("Document {}", feature.name),
            DOCUMENTATION_HOURS,
            everything,
        );

        self.tasks
    }
}
