//! Feature status classification.
//!
//! Precedence, first match wins:
//! 1. explicit marker in the feature's debt section (`✅ Complete`, `Status: partial`, ...)
//! 2. "What exists" / "What's missing" phrases in that section
//! 3. checked state of the acceptance criteria
//! 4. `MISSING`

use crate::features::{Feature, FeatureStatus};
use gearshift_markdown::{Document, SectionQuery};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

static MARKER: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"(?:✅|status:)\s*\**\s*(complete)|(?:⚠\x{FE0F}?|status:)\s*\**\s*(partial)|(?:❌|status:)\s*\**\s*(missing)",
    )
    .case_insensitive(true)
    .build()
    .expect("Invalid regex pattern")
});

static WHAT_EXISTS: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"what\s+exists")
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern")
});

static WHATS_MISSING: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"what(?:'|’|\s+i)s\s+missing")
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern")
});

/// Which rule produced a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    ExplicitMarker,
    ExistsMissing,
    AcceptanceCriteria,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDecision {
    pub status: FeatureStatus,
    pub source: StatusSource,
}

impl StatusDecision {
    fn new(status: FeatureStatus, source: StatusSource) -> Self {
        Self { status, source }
    }
}

/// Pluggable status classification.
pub trait StatusStrategy: Send + Sync {
    fn detect(&self, feature: &Feature, debt: Option<&Document>) -> StatusDecision;
}

/// Prose heuristics over the debt document and acceptance criteria.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStatusDetector;

impl StatusStrategy for HeuristicStatusDetector {
    fn detect(&self, feature: &Feature, debt: Option<&Document>) -> StatusDecision {
        if let Some(body) = debt.and_then(|d| debt_section_text(d, &feature.name)) {
            if let Some(status) = explicit_marker(&body) {
                return StatusDecision::new(status, StatusSource::ExplicitMarker);
            }
            let exists = WHAT_EXISTS.is_match(&body);
            let missing = WHATS_MISSING.is_match(&body);
            let status = match (exists, missing) {
                (true, true) => Some(FeatureStatus::Partial),
                (true, false) => Some(FeatureStatus::Complete),
                (false, true) => Some(FeatureStatus::Missing),
                (false, false) => None,
            };
            if let Some(status) = status {
                return StatusDecision::new(status, StatusSource::ExistsMissing);
            }
        }

        if !feature.acceptance_criteria.is_empty() {
            let checked = feature.checked_criteria();
            let status = if checked == feature.acceptance_criteria.len() {
                FeatureStatus::Complete
            } else if checked > 0 {
                FeatureStatus::Partial
            } else {
                FeatureStatus::Missing
            };
            return StatusDecision::new(status, StatusSource::AcceptanceCriteria);
        }

        StatusDecision::new(FeatureStatus::Missing, StatusSource::Default)
    }
}

/// Classify with the default heuristics.
pub fn detect_status(feature: &Feature, debt: Option<&Document>) -> FeatureStatus {
    HeuristicStatusDetector.detect(feature, debt).status
}

/// Body of the first debt section whose heading contains `name`.
pub(crate) fn debt_section_text(debt: &Document, name: &str) -> Option<String> {
    let query = SectionQuery::pattern(&regex::escape(name)).ok()?;
    debt.find_section(&query).map(|s| s.text())
}

/// The earliest explicit marker in `body`.
fn explicit_marker(body: &str) -> Option<FeatureStatus> {
    let caps = MARKER.captures(body)?;
    if caps.get(1).is_some() {
        Some(FeatureStatus::Complete)
    } else if caps.get(2).is_some() {
        Some(FeatureStatus::Partial)
    } else {
        Some(FeatureStatus::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AcceptanceCriterion;
    use gearshift_test_utils::fixtures::LOGIN_DEBT_DOC;
    use test_case::test_case;

    fn feature(name: &str, checks: &[bool]) -> Feature {
        Feature {
            id: "001".into(),
            name: name.into(),
            slug: gearshift_common_core::slugify(name),
            description: String::new(),
            user_stories: vec![],
            acceptance_criteria: checks
                .iter()
                .map(|&checked| AcceptanceCriterion {
                    description: "criterion".into(),
                    checked,
                    testable: true,
                })
                .collect(),
            status: FeatureStatus::Missing,
            dependencies: vec![],
            technical_requirements: None,
            source_line: 1,
        }
    }

    fn debt(text: &str) -> Document {
        Document::parse("debt.md", text).unwrap()
    }

    #[test]
    fn test_login_debt_is_partial() {
        let decision = HeuristicStatusDetector.detect(&feature("Login", &[]), Some(&debt(LOGIN_DEBT_DOC)));
        assert_eq!(decision.status, FeatureStatus::Partial);
        assert_eq!(decision.source, StatusSource::ExistsMissing);
    }

    #[test]
    fn test_explicit_marker_beats_exists_missing() {
        let doc = debt("## Login\n\n✅ Complete\n\nWhat exists:\n- form\n\nWhat's missing:\n- recovery\n");
        let decision = HeuristicStatusDetector.detect(&feature("Login", &[]), Some(&doc));
        assert_eq!(decision.status, FeatureStatus::Complete);
        assert_eq!(decision.source, StatusSource::ExplicitMarker);
    }

    #[test_case("✅ Complete", FeatureStatus::Complete ; "check mark")]
    #[test_case("⚠️ Partial", FeatureStatus::Partial ; "warning with selector")]
    #[test_case("⚠ partial", FeatureStatus::Partial ; "warning bare")]
    #[test_case("❌ Missing", FeatureStatus::Missing ; "cross")]
    #[test_case("Status: **Partial**", FeatureStatus::Partial ; "bold status")]
    #[test_case("status: missing", FeatureStatus::Missing ; "lowercase status")]
    fn test_markers(marker: &str, expected: FeatureStatus) {
        let doc = debt(&format!("## Login\n\n{marker}\n"));
        assert_eq!(detect_status(&feature("Login", &[true]), Some(&doc)), expected);
    }

    #[test_case("What exists:\n- a\n", FeatureStatus::Complete ; "only exists")]
    #[test_case("What's missing:\n- b\n", FeatureStatus::Missing ; "only missing")]
    #[test_case("What exists:\n- a\n\nWhat is missing:\n- b\n", FeatureStatus::Partial ; "both spelled out")]
    fn test_exists_missing(body: &str, expected: FeatureStatus) {
        let doc = debt(&format!("## Login\n\n{body}"));
        assert_eq!(detect_status(&feature("Login", &[]), Some(&doc)), expected);
    }

    #[test_case(&[true, true], FeatureStatus::Complete ; "all checked")]
    #[test_case(&[true, false], FeatureStatus::Partial ; "some checked")]
    #[test_case(&[false, false], FeatureStatus::Missing ; "none checked")]
    fn test_acceptance_criteria_fallback(checks: &[bool], expected: FeatureStatus) {
        let decision = HeuristicStatusDetector.detect(&feature("Login", checks), None);
        assert_eq!(decision.status, expected);
        assert_eq!(decision.source, StatusSource::AcceptanceCriteria);
    }

    #[test]
    fn test_unrelated_debt_section_falls_through() {
        let doc = debt("## Billing\n\n❌ Missing\n");
        let decision = HeuristicStatusDetector.detect(&feature("Login", &[true]), Some(&doc));
        assert_eq!(decision.status, FeatureStatus::Complete);
        assert_eq!(decision.source, StatusSource::AcceptanceCriteria);
    }

    #[test]
    fn test_default_is_missing() {
        let decision = HeuristicStatusDetector.detect(&feature("Login", &[]), None);
        assert_eq!(decision, StatusDecision::new(FeatureStatus::Missing, StatusSource::Default));
    }

    #[test]
    fn test_name_is_matched_literally() {
        let doc = debt("## Search (beta)\n\nStatus: complete\n");
        assert_eq!(
            detect_status(&feature("Search (beta)", &[]), Some(&doc)),
            FeatureStatus::Complete
        );
    }
}
