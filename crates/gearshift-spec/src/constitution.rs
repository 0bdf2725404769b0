//! Project constitution extraction.

use crate::error::{ExtractionError, ExtractionPhase};
use gearshift_common_core::Route;
use gearshift_common_log::spans::document_span;
use gearshift_markdown::{following_list, BlockKind, Document, Section, SectionQuery};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, info};

/// Allowed purpose length, in characters.
pub const PURPOSE_CHARS: RangeInclusive<usize> = 50..=500;
/// Allowed number of core values.
pub const VALUE_COUNT: RangeInclusive<usize> = 3..=10;
pub const MIN_STANDARDS: usize = 3;
pub const MIN_QUALITY_METRICS: usize = 2;

/// Sections whose content becomes development standards.
pub const STANDARD_SECTIONS: [&str; 4] = ["Code Quality", "Testing", "Security", "Documentation"];
/// Sections whose list items become quality metrics.
pub const METRIC_SECTIONS: [&str; 2] = ["Performance", "Scalability"];

static VALUES_HEADING: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^\s*(core\s+)?values\s*$")
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern")
});

/// Heading matching `title` exactly, ignoring case and surrounding emphasis.
fn exact_heading(title: &str) -> Regex {
    RegexBuilder::new(&format!(r"^\s*[*_]*\s*{}\s*[*_]*\s*$", regex::escape(title)))
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern")
}

static STANDARD_HEADINGS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| STANDARD_SECTIONS.iter().map(|t| (*t, exact_heading(t))).collect());

static METRIC_HEADINGS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| METRIC_SECTIONS.iter().map(|t| (*t, exact_heading(t))).collect());

static STACK_LINE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"^\s*(languages?|frameworks?|databases?|infrastructure|deployment|build\s+tools?)\s*:\s*(.+)$",
    )
    .case_insensitive(true)
    .build()
    .expect("Invalid regex pattern")
});

/// Languages, frameworks and tooling of an existing codebase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalStack {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub databases: Vec<String>,
    pub infrastructure: Vec<String>,
    pub build_tools: Vec<String>,
}

impl TechnicalStack {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
            && self.frameworks.is_empty()
            && self.databases.is_empty()
            && self.infrastructure.is_empty()
            && self.build_tools.is_empty()
    }

    fn bucket_mut(&mut self, label: &str) -> &mut Vec<String> {
        let label = label.to_lowercase();
        if label.starts_with("language") {
            &mut self.languages
        } else if label.starts_with("framework") {
            &mut self.frameworks
        } else if label.starts_with("database") {
            &mut self.databases
        } else if label.starts_with("build") {
            &mut self.build_tools
        } else {
            &mut self.infrastructure
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Governance {
    pub amendment_process: String,
    pub versioning: String,
    pub compliance_review: String,
}

impl Default for Governance {
    fn default() -> Self {
        Self {
            amendment_process: "Amendments are proposed in writing and approved by the maintainers"
                .to_string(),
            versioning: "Semantic versioning: major for principle changes, minor for additions, patch for clarifications"
                .to_string(),
            compliance_review: "Specifications are checked against this constitution before implementation"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standard {
    pub category: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetric {
    pub category: String,
    pub metric: String,
}

/// A fully validated constitution. There is no partially valid value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstitutionData {
    pub purpose: String,
    pub values: Vec<String>,
    pub technical_stack: Option<TechnicalStack>,
    pub development_standards: Vec<Standard>,
    pub quality_metrics: Vec<QualityMetric>,
    pub governance: Governance,
    pub route: Route,
}

/// Extract and validate the constitution from an analysis document.
///
/// Every cardinality bound is enforced; the first one violated is
/// reported as an [`ExtractionError`] naming the field and bound.
pub fn extract_constitution(doc: &Document, route: Route) -> Result<ConstitutionData, ExtractionError> {
    let _span = document_span("constitution", &doc.path.display().to_string()).entered();

    let purpose = extract_purpose(doc)?;
    let values = extract_values(doc)?;
    let technical_stack = if route.requires_stack() {
        Some(extract_stack(doc)?)
    } else {
        None
    };

    let development_standards = extract_standards(doc);
    if development_standards.len() < MIN_STANDARDS {
        return Err(ExtractionError::out_of_bounds(
            ExtractionPhase::Constitution,
            "developmentStandards",
            format!("at least {MIN_STANDARDS} items"),
            development_standards.len(),
        ));
    }

    let quality_metrics = extract_metrics(doc);
    if quality_metrics.len() < MIN_QUALITY_METRICS {
        return Err(ExtractionError::out_of_bounds(
            ExtractionPhase::Constitution,
            "qualityMetrics",
            format!("at least {MIN_QUALITY_METRICS} items"),
            quality_metrics.len(),
        ));
    }

    let governance = extract_governance(doc);

    info!(
        values = values.len(),
        standards = development_standards.len(),
        metrics = quality_metrics.len(),
        route = route.as_str(),
        "constitution extracted"
    );

    Ok(ConstitutionData {
        purpose,
        values,
        technical_stack,
        development_standards,
        quality_metrics,
        governance,
        route,
    })
}

fn extract_purpose(doc: &Document) -> Result<String, ExtractionError> {
    let section = doc
        .find_section(&SectionQuery::new("Purpose"))
        .ok_or_else(|| ExtractionError::missing_section(ExtractionPhase::Constitution, "Purpose"))?;

    let purpose = section.text().trim().to_string();
    let len = purpose.chars().count();
    if !PURPOSE_CHARS.contains(&len) {
        return Err(ExtractionError::out_of_bounds(
            ExtractionPhase::Constitution,
            "purpose",
            format!("{}-{} characters", PURPOSE_CHARS.start(), PURPOSE_CHARS.end()),
            len,
        ));
    }
    Ok(purpose)
}

fn extract_values(doc: &Document) -> Result<Vec<String>, ExtractionError> {
    let query = SectionQuery::from(VALUES_HEADING.clone());
    let section = doc
        .find_section(&query)
        .ok_or_else(|| ExtractionError::missing_section(ExtractionPhase::Constitution, "Core Values"))?;

    let values: Vec<String> = following_list(&doc.nodes, section.index)
        .into_iter()
        .map(|v| strip_emphasis(&v).to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if !VALUE_COUNT.contains(&values.len()) {
        return Err(ExtractionError::out_of_bounds(
            ExtractionPhase::Constitution,
            "values",
            format!("{}-{} items", VALUE_COUNT.start(), VALUE_COUNT.end()),
            values.len(),
        ));
    }
    Ok(values)
}

fn extract_stack(doc: &Document) -> Result<TechnicalStack, ExtractionError> {
    let section = doc
        .find_section(&SectionQuery::new("Technical Stack"))
        .ok_or_else(|| {
            ExtractionError::missing_section(ExtractionPhase::Constitution, "Technical Stack")
        })?;

    let mut stack = TechnicalStack::default();
    for node in section.children {
        let line = node.text().replace("**", "");
        let Some(caps) = STACK_LINE.captures(&line) else {
            continue;
        };
        let bucket = stack.bucket_mut(&caps[1]);
        bucket.extend(
            caps[2]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }

    if stack.is_empty() {
        return Err(ExtractionError::new(
            ExtractionPhase::Constitution,
            "Technical Stack section lists no languages, frameworks, databases, infrastructure or build tools",
        ));
    }
    Ok(stack)
}

fn extract_standards(doc: &Document) -> Vec<Standard> {
    STANDARD_HEADINGS
        .iter()
        .filter_map(|(category, heading)| {
            doc.find_section(&SectionQuery::from(heading.clone()))
                .map(|section| (category, section))
        })
        .flat_map(|(category, section)| {
            let mut rules = section.list_items();
            if rules.is_empty() {
                rules.extend(first_paragraph(&section));
            }
            rules.into_iter().map(move |rule| Standard {
                category: (*category).to_string(),
                rule: strip_emphasis(&rule).to_string(),
            })
        })
        .collect()
}

fn extract_metrics(doc: &Document) -> Vec<QualityMetric> {
    METRIC_HEADINGS
        .iter()
        .filter_map(|(category, heading)| {
            doc.find_section(&SectionQuery::from(heading.clone()))
                .map(|section| (category, section))
        })
        .flat_map(|(category, section)| {
            section.list_items().into_iter().map(move |metric| QualityMetric {
                category: (*category).to_string(),
                metric: strip_emphasis(&metric).to_string(),
            })
        })
        .collect()
}

fn extract_governance(doc: &Document) -> Governance {
    let mut governance = Governance::default();
    let Some(section) = doc.find_section(&SectionQuery::new("Governance")) else {
        debug!("no governance section, using defaults");
        return governance;
    };

    let (mut amend, mut version, mut review) = (None, None, None);
    for node in section.children.iter().filter(|n| !n.is_heading()) {
        let text = strip_emphasis(node.text());
        let lower = text.to_lowercase();
        if amend.is_none() && lower.contains("amend") {
            amend = Some(text.to_string());
        } else if version.is_none() && lower.contains("version") {
            version = Some(text.to_string());
        } else if review.is_none() && (lower.contains("review") || lower.contains("compliance")) {
            review = Some(text.to_string());
        }
    }

    if let Some(v) = amend {
        governance.amendment_process = v;
    }
    if let Some(v) = version {
        governance.versioning = v;
    }
    if let Some(v) = review {
        governance.compliance_review = v;
    }
    governance
}

fn first_paragraph(section: &Section<'_>) -> Option<String> {
    section.children.iter().find_map(|n| match &n.kind {
        BlockKind::Paragraph { text } => Some(text.clone()),
        _ => None,
    })
}

pub(crate) fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '*' || c == '_').trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearshift_test_utils::fixtures::SAMPLE_CONSTITUTION_DOC;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::parse("analysis.md", text).unwrap()
    }

    fn sample() -> Document {
        doc(SAMPLE_CONSTITUTION_DOC)
    }

    #[test]
    fn test_brownfield_sample() {
        let c = extract_constitution(&sample(), Route::Brownfield).unwrap();

        assert!(c.purpose.starts_with("Gearshift turns"));
        assert_eq!(c.values.len(), 4);
        assert_eq!(c.values[0], "Clarity over cleverness");

        let stack = c.technical_stack.unwrap();
        assert_eq!(stack.languages, vec!["Rust", "TypeScript"]);
        assert_eq!(stack.frameworks, vec!["Axum", "React"]);
        assert_eq!(stack.databases, vec!["PostgreSQL"]);
        assert_eq!(stack.infrastructure, vec!["Docker", "Kubernetes"]);
        assert_eq!(stack.build_tools, vec!["Cargo", "pnpm"]);

        assert_eq!(c.development_standards.len(), 5);
        assert_eq!(
            c.development_standards[4],
            Standard {
                category: "Documentation".into(),
                rule: "Public APIs are documented with examples.".into(),
            }
        );
        assert_eq!(c.quality_metrics.len(), 2);
        assert_eq!(c.quality_metrics[1].category, "Scalability");
    }

    #[test]
    fn test_governance_lines_are_classified() {
        let c = extract_constitution(&sample(), Route::Greenfield).unwrap();
        assert!(c.governance.amendment_process.starts_with("Amendments require"));
        assert!(c.governance.versioning.contains("semantic versioning"));
        assert!(c.governance.compliance_review.starts_with("Compliance review"));
    }

    #[test]
    fn test_greenfield_has_no_stack() {
        let c = extract_constitution(&sample(), Route::Greenfield).unwrap();
        assert!(c.technical_stack.is_none());
    }

    #[test]
    fn test_brownfield_requires_stack_section() {
        let text = SAMPLE_CONSTITUTION_DOC.replace("## Technical Stack", "## Tooling Notes");
        let err = extract_constitution(&doc(&text), Route::Brownfield).unwrap_err();
        assert_eq!(err.details.field.as_deref(), Some("Technical Stack"));

        assert!(extract_constitution(&doc(&text), Route::Greenfield).is_ok());
    }

    #[test]
    fn test_missing_purpose() {
        let text = SAMPLE_CONSTITUTION_DOC.replace("## Purpose", "## Intent");
        let err = extract_constitution(&doc(&text), Route::Greenfield).unwrap_err();
        assert_eq!(err.phase, ExtractionPhase::Constitution);
        assert!(err.message.contains("Purpose"));
    }

    #[test]
    fn test_too_few_values() {
        let text = SAMPLE_CONSTITUTION_DOC
            .replace("- Every change is reviewable\n", "")
            .replace("- Automate the boring parts\n", "");
        let err = extract_constitution(&doc(&text), Route::Greenfield).unwrap_err();
        assert_eq!(err.details.field.as_deref(), Some("values"));
        assert_eq!(err.details.actual.as_deref(), Some("2"));
    }

    #[test]
    fn test_too_few_metrics() {
        let text = SAMPLE_CONSTITUTION_DOC.replace("- Handles 10k concurrent users\n", "");
        let err = extract_constitution(&doc(&text), Route::Greenfield).unwrap_err();
        assert_eq!(err.details.field.as_deref(), Some("qualityMetrics"));
    }

    #[test]
    fn test_bold_stack_labels() {
        let text = SAMPLE_CONSTITUTION_DOC.replace("- Languages: Rust, TypeScript", "- **Languages:** Go");
        let c = extract_constitution(&doc(&text), Route::Brownfield).unwrap();
        assert_eq!(c.technical_stack.unwrap().languages, vec!["Go"]);
    }

    #[test]
    fn test_category_headings_match_whole_title() {
        let text = SAMPLE_CONSTITUTION_DOC.replace(
            "## Purpose",
            "### Security Settings\n\n- Toggle two-factor login\n\n### Performance Dashboard\n\n- Charts load lazily\n\n## Purpose",
        );
        let c = extract_constitution(&doc(&text), Route::Greenfield).unwrap();

        let security: Vec<&str> = c
            .development_standards
            .iter()
            .filter(|s| s.category == "Security")
            .map(|s| s.rule.as_str())
            .collect();
        assert_eq!(security, vec!["Secrets never live in the repository"]);
        assert_eq!(c.quality_metrics[0].metric, "API p95 latency under 200ms");
    }
}
