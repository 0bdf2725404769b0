//! Section-scoped queries over a parsed node slice.
//!
//! A section is a heading plus every following node up to, not including,
//! the next heading whose level is at most the section heading's level.

use crate::node::{BlockKind, BlockNode};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Case-insensitive heading matcher.
#[derive(Debug, Clone)]
pub enum SectionQuery {
    /// Literal title; matches headings containing it.
    Title(String),
    /// Regex searched anywhere in the heading text.
    Pattern(Regex),
}

impl SectionQuery {
    /// Literal title query.
    pub fn new(title: &str) -> Self {
        Self::Title(title.to_lowercase())
    }

    /// Regex query, compiled case-insensitively.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
    }

    pub fn is_match(&self, heading: &str) -> bool {
        match self {
            Self::Title(title) => heading.to_lowercase().contains(title.as_str()),
            Self::Pattern(re) => re.is_match(heading),
        }
    }
}

impl From<Regex> for SectionQuery {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

/// A heading and the nodes it governs, borrowed from the node slice.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub heading: &'a BlockNode,
    pub level: u8,
    pub children: &'a [BlockNode],
    /// Position of `heading` in the slice it was found in.
    pub index: usize,
}

impl<'a> Section<'a> {
    pub fn title(&self) -> &'a str {
        self.heading.text()
    }

    /// Children joined one per line.
    pub fn text(&self) -> String {
        section_text(self.children)
    }

    pub fn list_items(&self) -> Vec<String> {
        extract_list_items(self.children)
    }

    /// First nested section matching `query`.
    pub fn subsection(&self, query: &SectionQuery) -> Option<Section<'a>> {
        find_section(self.children, query)
    }
}

/// Build the section headed by `nodes[index]`.
fn section_at(nodes: &[BlockNode], index: usize, level: u8) -> Section<'_> {
    let start = index + 1;
    let end = nodes[start..]
        .iter()
        .position(|n| n.heading_level().is_some_and(|l| l <= level))
        .map_or(nodes.len(), |p| start + p);

    Section {
        heading: &nodes[index],
        level,
        children: &nodes[start..end],
        index,
    }
}

/// First heading matching `query`, with its children.
pub fn find_section<'a>(nodes: &'a [BlockNode], query: &SectionQuery) -> Option<Section<'a>> {
    let found = nodes.iter().enumerate().find_map(|(i, n)| match &n.kind {
        BlockKind::Heading { level, text } if query.is_match(text) => Some((i, *level)),
        _ => None,
    });

    match found {
        Some((i, level)) => Some(section_at(nodes, i, level)),
        None => {
            debug!(?query, "section not found");
            None
        }
    }
}

/// Every heading matching `query`, in document order.
pub fn find_all_sections<'a>(nodes: &'a [BlockNode], query: &SectionQuery) -> Vec<Section<'a>> {
    nodes
        .iter()
        .enumerate()
        .filter_map(|(i, n)| match &n.kind {
            BlockKind::Heading { level, text } if query.is_match(text) => {
                Some(section_at(nodes, i, *level))
            }
            _ => None,
        })
        .collect()
}

/// Headings of exactly `level`.
pub fn extract_headings(nodes: &[BlockNode], level: u8) -> Vec<&BlockNode> {
    nodes
        .iter()
        .filter(|n| n.heading_level() == Some(level))
        .collect()
}

/// Text of every list item in `nodes`.
pub fn extract_list_items(nodes: &[BlockNode]) -> Vec<String> {
    nodes
        .iter()
        .filter(|n| n.is_list_item())
        .map(|n| n.text().to_string())
        .collect()
}

/// The first run of list items after `nodes[index]`, stopping at a heading.
pub fn following_list(nodes: &[BlockNode], index: usize) -> Vec<String> {
    nodes
        .iter()
        .skip(index + 1)
        .skip_while(|n| !n.is_list_item() && !n.is_heading())
        .take_while(|n| n.is_list_item())
        .map(|n| n.text().to_string())
        .collect()
}

/// Node text joined one per line; rules are skipped.
pub fn section_text(nodes: &[BlockNode]) -> String {
    nodes
        .iter()
        .filter(|n| !matches!(n.kind, BlockKind::HorizontalRule))
        .map(BlockNode::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A fenced block borrowed from the node slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlockRef<'a> {
    pub text: &'a str,
    pub language: Option<&'a str>,
    pub line: usize,
}

/// Code blocks, optionally restricted to one language (case-insensitive).
pub fn extract_code_blocks<'a>(nodes: &'a [BlockNode], language: Option<&str>) -> Vec<CodeBlockRef<'a>> {
    nodes
        .iter()
        .filter_map(|n| match &n.kind {
            BlockKind::CodeBlock { text, language: lang } => Some(CodeBlockRef {
                text,
                language: lang.as_deref(),
                line: n.line,
            }),
            _ => None,
        })
        .filter(|b| match language {
            Some(wanted) => b.language.is_some_and(|l| l.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use proptest::prelude::*;

    const DOC: &str = "\
# Project

## Purpose

Build things.

## Values

Intro line.

- Speed
- Care

### Nested

- inner

## Features

text
";

    #[test]
    fn test_find_section_bounds() {
        let nodes = parse(DOC).unwrap();
        let values = find_section(&nodes, &SectionQuery::new("values")).unwrap();
        assert_eq!(values.title(), "Values");
        assert_eq!(values.level, 2);
        // Nested level-3 heading belongs to the section
        assert_eq!(values.list_items(), vec!["Speed", "Care", "inner"]);
        assert!(values.children.iter().all(|n| n.heading_level().map_or(true, |l| l > 2)));
    }

    #[test]
    fn test_section_runs_to_end_of_document() {
        let nodes = parse(DOC).unwrap();
        let features = find_section(&nodes, &SectionQuery::new("FEATURES")).unwrap();
        assert_eq!(features.text(), "text");
    }

    #[test]
    fn test_missing_section() {
        let nodes = parse(DOC).unwrap();
        assert!(find_section(&nodes, &SectionQuery::new("Governance")).is_none());
    }

    #[test]
    fn test_pattern_query() {
        let nodes = parse(DOC).unwrap();
        let q = SectionQuery::pattern(r"^(core\s+)?values$").unwrap();
        assert!(find_section(&nodes, &q).is_some());
        let q = SectionQuery::pattern(r"^purpose|^features").unwrap();
        let all = find_all_sections(&nodes, &q);
        let titles: Vec<_> = all.iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["Purpose", "Features"]);
    }

    #[test]
    fn test_following_list_skips_paragraphs() {
        let nodes = parse(DOC).unwrap();
        let values = find_section(&nodes, &SectionQuery::new("values")).unwrap();
        assert_eq!(following_list(&nodes, values.index), vec!["Speed", "Care"]);

        let purpose = find_section(&nodes, &SectionQuery::new("purpose")).unwrap();
        assert!(following_list(&nodes, purpose.index).is_empty());
    }

    #[test]
    fn test_extract_headings() {
        let nodes = parse(DOC).unwrap();
        let h2: Vec<_> = extract_headings(&nodes, 2).iter().map(|n| n.text()).collect();
        assert_eq!(h2, vec!["Purpose", "Values", "Features"]);
    }

    #[test]
    fn test_extract_code_blocks_by_language() {
        let nodes = parse("```Rust\nlet a = 1;\n```\n```\nplain\n```\n```json\n{}\n```\n").unwrap();
        assert_eq!(extract_code_blocks(&nodes, None).len(), 3);
        let rust = extract_code_blocks(&nodes, Some("rust"));
        assert_eq!(rust.len(), 1);
        assert_eq!(rust[0].text, "let a = 1;");
        assert_eq!(rust[0].line, 1);
    }

    proptest! {
        #[test]
        fn prop_section_children_never_contain_peer_heading(
            levels in prop::collection::vec(1u8..=6, 1..12),
            pick in 0usize..12,
        ) {
            let text: String = levels
                .iter()
                .enumerate()
                .map(|(i, l)| format!("{} H{}\n\nbody {}\n\n", "#".repeat(*l as usize), i, i))
                .collect();
            let nodes = parse(&text).unwrap();
            let target = pick % levels.len();
            let q = SectionQuery::pattern(&format!("^H{}$", target)).unwrap();
            let section = find_section(&nodes, &q).unwrap();
            let level = levels[target];

            prop_assert!(section
                .children
                .iter()
                .all(|n| n.heading_level().map_or(true, |l| l > level)));

            // Boundary is exact: the node after the section is a peer heading or end of input.
            let end = section.index + 1 + section.children.len();
            if let Some(next) = nodes.get(end) {
                prop_assert!(next.heading_level().is_some_and(|l| l <= level));
            }
        }
    }
}
