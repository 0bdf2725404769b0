//! Single forward scan over lines.
//!
//! Classification order, first match wins: code fence, heading, horizontal
//! rule, blockquote, list item, paragraph. Blank lines produce nothing.

use crate::error::ParseError;
use crate::node::{BlockKind, BlockNode};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.+?)[ \t]*$").expect("Invalid regex pattern"));

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)([-*+]|\d+[.)])[ \t]+(.*?)[ \t]*$").expect("Invalid regex pattern")
});

const FENCE: &str = "```";

/// Open fence bookkeeping.
struct OpenFence {
    line: usize,
    language: Option<String>,
    body: Vec<String>,
}

/// Parse markdown text into a flat node sequence.
pub fn parse(text: &str) -> Result<Vec<BlockNode>, ParseError> {
    let mut nodes = Vec::new();
    let mut fence: Option<OpenFence> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();

        if fence.is_some() {
            if trimmed.starts_with(FENCE) {
                if let Some(open) = fence.take() {
                    nodes.push(BlockNode::new(
                        BlockKind::CodeBlock {
                            text: open.body.join("\n"),
                            language: open.language,
                        },
                        open.line,
                    ));
                }
            } else if let Some(open) = fence.as_mut() {
                open.body.push(raw.to_string());
            }
            continue;
        }

        if let Some(info) = trimmed.strip_prefix(FENCE) {
            let info = info.trim();
            fence = Some(OpenFence {
                line: line_no,
                language: (!info.is_empty()).then(|| info.to_string()),
                body: Vec::new(),
            });
            continue;
        }

        if let Some(kind) = classify(raw, trimmed) {
            nodes.push(BlockNode::new(kind, line_no));
        }
    }

    if let Some(open) = fence {
        return Err(ParseError::UnterminatedCodeFence { line: open.line });
    }

    debug!(nodes = nodes.len(), "markdown parsed");
    Ok(nodes)
}

/// Classify one line outside a code fence.
fn classify(raw: &str, trimmed: &str) -> Option<BlockKind> {
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = HEADING.captures(raw) {
        let level = caps[1].len() as u8;
        let text = strip_closing_hashes(&caps[2]);
        if !text.is_empty() {
            return Some(BlockKind::Heading {
                level,
                text: text.to_string(),
            });
        }
    }

    if is_horizontal_rule(trimmed) {
        return Some(BlockKind::HorizontalRule);
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        let text = rest.strip_prefix(' ').unwrap_or(rest);
        return Some(BlockKind::Blockquote {
            text: text.trim_end().to_string(),
        });
    }

    if let Some(caps) = LIST_ITEM.captures(raw) {
        let marker = &caps[2];
        return Some(BlockKind::ListItem {
            text: caps[3].to_string(),
            ordered: marker.starts_with(|c: char| c.is_ascii_digit()),
            indent: indent_width(&caps[1]) / 2,
        });
    }

    Some(BlockKind::Paragraph {
        text: trimmed.to_string(),
    })
}

/// `## Title ##` closes with optional hashes.
fn strip_closing_hashes(text: &str) -> &str {
    let stripped = text.trim_end_matches('#');
    if stripped.len() != text.len() && stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        text
    }
}

/// Three or more of the same `-`, `*` or `_`, optionally space separated.
fn is_horizontal_rule(trimmed: &str) -> bool {
    let mut chars = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Leading whitespace width with tabs counted as two spaces.
fn indent_width(leading: &str) -> usize {
    leading
        .chars()
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn kinds(text: &str) -> Vec<BlockKind> {
        parse(text).unwrap().into_iter().map(|n| n.kind).collect()
    }

    #[test]
    fn test_parse_all_block_kinds() {
        let text = "# Title\n\nSome text.\n\n- item\n1. first\n> quoted\n---\n```rust\nfn main() {}\n```\n";
        assert_eq!(
            kinds(text),
            vec![
                BlockKind::Heading { level: 1, text: "Title".into() },
                BlockKind::Paragraph { text: "Some text.".into() },
                BlockKind::ListItem { text: "item".into(), ordered: false, indent: 0 },
                BlockKind::ListItem { text: "first".into(), ordered: true, indent: 0 },
                BlockKind::Blockquote { text: "quoted".into() },
                BlockKind::HorizontalRule,
                BlockKind::CodeBlock { text: "fn main() {}".into(), language: Some("rust".into()) },
            ]
        );
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let nodes = parse("# A\n\ntext\n\n```\ncode\n```\n").unwrap();
        let lines: Vec<usize> = nodes.iter().map(|n| n.line).collect();
        assert_eq!(lines, vec![1, 3, 5]);
    }

    #[test]
    fn test_unterminated_fence_reports_opening_line() {
        let err = parse("# A\n\n```python\nprint(1)\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedCodeFence { line: 3 });
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_fence_content_is_verbatim() {
        let nodes = parse("```\n# not a heading\n  - not a list\n\n```").unwrap();
        assert_eq!(
            nodes[0].kind,
            BlockKind::CodeBlock {
                text: "# not a heading\n  - not a list\n".into(),
                language: None
            }
        );
    }

    #[test_case("- [ ] todo", "[ ] todo" ; "unchecked box kept")]
    #[test_case("* [x] done", "[x] done" ; "checked box kept")]
    #[test_case("+ plain", "plain" ; "plus marker")]
    fn test_list_item_text(line: &str, expected: &str) {
        match &kinds(line)[0] {
            BlockKind::ListItem { text, .. } => assert_eq!(text, expected),
            other => panic!("expected list item, got {:?}", other),
        }
    }

    #[test_case("- a", 0 ; "no indent")]
    #[test_case("  - a", 1 ; "two spaces")]
    #[test_case("    - a", 2 ; "four spaces")]
    #[test_case("\t- a", 1 ; "tab")]
    #[test_case("   2) a", 1 ; "odd spaces round down")]
    fn test_list_indent(line: &str, expected: usize) {
        match &kinds(line)[0] {
            BlockKind::ListItem { indent, .. } => assert_eq!(*indent, expected),
            other => panic!("expected list item, got {:?}", other),
        }
    }

    #[test_case("---" ; "dashes")]
    #[test_case("* * *" ; "spaced stars")]
    #[test_case("_____" ; "underscores")]
    fn test_horizontal_rule(line: &str) {
        assert_eq!(kinds(line), vec![BlockKind::HorizontalRule]);
    }

    #[test_case("#hashtag" ; "no space after hash")]
    #[test_case("####### seven" ; "too many hashes")]
    #[test_case("-- two dashes" ; "two dashes")]
    fn test_paragraph_fallbacks(line: &str) {
        assert!(matches!(kinds(line)[0], BlockKind::Paragraph { .. }));
    }

    #[test]
    fn test_heading_closing_hashes() {
        assert_eq!(
            kinds("## Features ##"),
            vec![BlockKind::Heading { level: 2, text: "Features".into() }]
        );
        assert_eq!(
            kinds("### C#"),
            vec![BlockKind::Heading { level: 3, text: "C#".into() }]
        );
    }

    #[test]
    fn test_consecutive_paragraph_lines_stay_separate() {
        assert_eq!(kinds("one\ntwo").len(), 2);
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(
            kinds("# A\r\n\r\ntext\r\n"),
            vec![
                BlockKind::Heading { level: 1, text: "A".into() },
                BlockKind::Paragraph { text: "text".into() },
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_fence_count_matches_code_blocks(
            bodies in prop::collection::vec("[a-z ]{0,12}", 0..6)
        ) {
            let text: String = bodies
                .iter()
                .map(|b| format!("para\n```\n{}\n```\n", b))
                .collect();
            let nodes = parse(&text).unwrap();
            let blocks = nodes.iter().filter(|n| matches!(n.kind, BlockKind::CodeBlock { .. })).count();
            prop_assert_eq!(blocks, bodies.len());
        }

        #[test]
        fn prop_odd_fence_count_fails(pairs in 0usize..5) {
            let text = format!("{}```\ndangling\n", "```\nx\n```\n".repeat(pairs));
            prop_assert!(parse(&text).is_err());
        }
    }
}
