//! Feature extraction.

use crate::constitution::strip_emphasis;
use crate::error::{ExtractionError, ExtractionPhase};
use crate::status::{HeuristicStatusDetector, StatusStrategy};
use gearshift_common_core::{sequence_id, slugify};
use gearshift_common_log::spans::document_span;
use gearshift_markdown::{following_list, BlockKind, BlockNode, Document, SectionQuery};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Shortest paragraph accepted as a feature description.
pub const MIN_DESCRIPTION_CHARS: usize = 20;

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern")
}

static FEATURES_HEADING: Lazy<Regex> = Lazy::new(|| ci(r"^\s*(?:key\s+|core\s+)?features\b"));

/// Level-2 headings that end the feature list once a feature was seen.
static GENERIC_TITLE: Lazy<Regex> =
    Lazy::new(|| ci(r"non-functional|technical|overview|summary|appendix"));

static SUBSECTION_TITLE: Lazy<Regex> = Lazy::new(|| {
    ci(r"^\s*(acceptance\s+criteria|technical\s+requirements|dependencies|user\s+stories)\b")
});

static USER_STORY: Lazy<Regex> =
    Lazy::new(|| ci(r"\bas an? (.+?),\s*i want (.+?),?\s+so that (.+?)[.!]?\s*$"));

static CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([ xX])\]\s*(.*)$").expect("Invalid regex pattern"));

static DEPENDS_ON: Lazy<Regex> = Lazy::new(|| ci(r"^depends\s+on\s*:?\s*(.+)$"));

static DEPENDENCIES_LABEL: Lazy<Regex> = Lazy::new(|| ci(r"^dependencies\s*:?$"));

/// Words that make a criterion impossible to check mechanically.
const VAGUE_WORDS: [&str; 7] = [
    "user-friendly",
    "intuitive",
    "easy to",
    "fast",
    "nice",
    "appropriate",
    "etc",
];

/// Implementation status of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureStatus {
    Complete,
    Partial,
    Missing,
}

impl FeatureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "COMPLETE",
            Self::Partial => "PARTIAL",
            Self::Missing => "MISSING",
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "As a X, I want Y, so that Z".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub role: String,
    pub goal: String,
    pub benefit: String,
    pub raw_text: String,
}

impl UserStory {
    /// Parse a story sentence; `None` if `text` is not one.
    pub fn parse(text: &str) -> Option<Self> {
        let raw_text = strip_emphasis(text).to_string();
        let caps = USER_STORY.captures(&raw_text)?;
        Some(Self {
            role: caps[1].trim().to_string(),
            goal: caps[2].trim().to_string(),
            benefit: caps[3].trim().to_string(),
            raw_text: raw_text.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub description: String,
    pub checked: bool,
    pub testable: bool,
}

impl AcceptanceCriterion {
    /// Parse a list item, reading an optional `[ ]`/`[x]` prefix.
    pub fn parse(item: &str) -> Self {
        let item = item.trim();
        let (description, checked) = match CHECKBOX.captures(item) {
            Some(caps) => (caps[2].trim().to_string(), !caps[1].trim().is_empty()),
            None => (item.to_string(), false),
        };
        let lower = description.to_lowercase();
        let testable = !description.is_empty() && !VAGUE_WORDS.iter().any(|w| lower.contains(w));
        Self {
            description,
            checked,
            testable,
        }
    }
}

/// Technical requirement lines, bucketed by keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalRequirements {
    pub dependencies: Vec<String>,
    pub endpoints: Vec<String>,
    pub database: Vec<String>,
    pub components: Vec<String>,
    pub files: Vec<String>,
    pub other: Vec<String>,
}

impl TechnicalRequirements {
    /// Bucket each item by the first keyword it contains.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reqs = Self::default();
        for item in items {
            let item = item.as_ref().trim();
            let lower = item.to_lowercase();
            let bucket = if lower.contains("dependency") || lower.contains("dependencies") {
                &mut reqs.dependencies
            } else if lower.contains("endpoint") {
                &mut reqs.endpoints
            } else if lower.contains("database") {
                &mut reqs.database
            } else if lower.contains("component") {
                &mut reqs.components
            } else if lower.contains("file") {
                &mut reqs.files
            } else {
                &mut reqs.other
            };
            bucket.push(item.to_string());
        }
        reqs
    }

    pub fn is_empty(&self) -> bool {
        self.buckets().all(|(_, items)| items.is_empty())
    }

    /// `(label, items)` pairs in bucket order.
    pub fn buckets(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("Dependency", self.dependencies.as_slice()),
            ("Endpoint", self.endpoints.as_slice()),
            ("Database", self.database.as_slice()),
            ("Component", self.components.as_slice()),
            ("File", self.files.as_slice()),
            ("Other", self.other.as_slice()),
        ]
        .into_iter()
    }
}

/// One feature found in an analysis document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Zero-padded sequence number (`"001"`).
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub user_stories: Vec<UserStory>,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    pub status: FeatureStatus,
    pub dependencies: Vec<String>,
    pub technical_requirements: Option<TechnicalRequirements>,
    /// Line of the feature heading in its source document.
    pub source_line: usize,
}

impl Feature {
    pub fn checked_criteria(&self) -> usize {
        self.acceptance_criteria.iter().filter(|c| c.checked).count()
    }
}

/// Extract features, classifying status with [`HeuristicStatusDetector`].
pub fn extract_features(doc: &Document, debt: Option<&Document>) -> Result<Vec<Feature>, ExtractionError> {
    extract_features_with(doc, debt, &HeuristicStatusDetector)
}

/// Extract features, classifying status with `strategy`.
pub fn extract_features_with(
    doc: &Document,
    debt: Option<&Document>,
    strategy: &dyn StatusStrategy,
) -> Result<Vec<Feature>, ExtractionError> {
    let _span = document_span("features", &doc.path.display().to_string()).entered();

    let section = doc
        .find_section(&SectionQuery::from(FEATURES_HEADING.clone()))
        .ok_or_else(|| ExtractionError::missing_section(ExtractionPhase::Features, "Features"))?;

    let nodes = section.children;
    let (headings, boundary) = feature_headings(nodes, section.level);
    if headings.is_empty() {
        return Err(ExtractionError::new(
            ExtractionPhase::Features,
            "\"Features\" section contains no feature headings",
        ));
    }

    let mut features = Vec::with_capacity(headings.len());
    for (n, &index) in headings.iter().enumerate() {
        let end = headings.get(n + 1).copied().unwrap_or(boundary);
        let mut feature = build_feature(n + 1, &nodes[index], &nodes[index + 1..end]);
        let decision = strategy.detect(&feature, debt);
        debug!(feature = %feature.name, status = %decision.status, source = ?decision.source, "status detected");
        feature.status = decision.status;
        features.push(feature);
    }

    info!(count = features.len(), "features extracted");
    Ok(features)
}

/// Indices of the feature headings inside the Features section, plus the
/// index where the last feature's span ends.
fn feature_headings(nodes: &[BlockNode], section_level: u8) -> (Vec<usize>, usize) {
    let mut found = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        let BlockKind::Heading { level, text } = &node.kind else {
            continue;
        };
        if !(2..=3).contains(level) || *level <= section_level || SUBSECTION_TITLE.is_match(text) {
            continue;
        }
        if *level == 2 && !found.is_empty() && GENERIC_TITLE.is_match(text) {
            return (found, index);
        }
        found.push(index);
    }
    (found, nodes.len())
}

fn build_feature(sequence: usize, heading: &BlockNode, span: &[BlockNode]) -> Feature {
    let name = strip_emphasis(heading.text()).to_string();

    let user_stories: Vec<UserStory> = span
        .iter()
        .filter(|n| n.is_paragraph() || n.is_list_item())
        .filter_map(|n| UserStory::parse(n.text()))
        .collect();

    let acceptance_criteria = labelled_list(span, "acceptance criteria")
        .iter()
        .map(|item| AcceptanceCriterion::parse(item))
        .collect();

    let technical_requirements = Some(TechnicalRequirements::from_items(labelled_list(
        span,
        "technical requirements",
    )))
    .filter(|r| !r.is_empty());

    Feature {
        id: sequence_id(sequence),
        slug: slugify(&name),
        description: description(span),
        user_stories,
        acceptance_criteria,
        status: FeatureStatus::Missing,
        dependencies: dependencies(span),
        technical_requirements,
        source_line: heading.line,
        name,
    }
}

fn is_label(text: &str) -> bool {
    strip_emphasis(text).ends_with(':')
}

fn description(span: &[BlockNode]) -> String {
    let candidates: Vec<&str> = span
        .iter()
        .filter(|n| n.is_paragraph())
        .map(|n| strip_emphasis(n.text()))
        .filter(|t| !is_label(t) && !USER_STORY.is_match(t) && !DEPENDS_ON.is_match(t))
        .collect();

    candidates
        .iter()
        .find(|t| t.chars().count() >= MIN_DESCRIPTION_CHARS)
        .map(|t| t.to_string())
        .unwrap_or_default()
}

/// Items of the first list after a heading or label paragraph containing `label`.
fn labelled_list(span: &[BlockNode], label: &str) -> Vec<String> {
    span.iter()
        .position(|n| {
            (n.is_heading() || n.is_paragraph()) && n.text().to_lowercase().contains(label)
        })
        .map(|index| following_list(span, index))
        .unwrap_or_default()
}

fn dependencies(span: &[BlockNode]) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();
    let mut push = |dep: &str| {
        let dep = strip_emphasis(dep);
        if !dep.is_empty() && !deps.iter().any(|d| d == dep) {
            deps.push(dep.to_string());
        }
    };

    for (index, node) in span.iter().enumerate() {
        let text = strip_emphasis(node.text());
        if (node.is_heading() || node.is_paragraph()) && DEPENDENCIES_LABEL.is_match(text) {
            for item in following_list(span, index) {
                push(&item);
            }
        } else if node.is_paragraph() || node.is_list_item() {
            if let Some(caps) = DEPENDS_ON.captures(text) {
                for dep in caps[1].split(',') {
                    push(dep);
                }
            }
        }
    }
    deps
}
