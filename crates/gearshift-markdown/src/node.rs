//! Block node model.

use serde::{Deserialize, Serialize};

/// One block-level element with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(flatten)]
    pub kind: BlockKind,
    pub line: usize,
}

/// Block variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    /// Checkbox markers stay in `text`; the parser gives them no meaning.
    ListItem { text: String, ordered: bool, indent: usize },
    CodeBlock { text: String, language: Option<String> },
    Blockquote { text: String },
    HorizontalRule,
}

impl BlockNode {
    pub fn new(kind: BlockKind, line: usize) -> Self {
        Self { kind, line }
    }

    /// Text content; empty for horizontal rules.
    pub fn text(&self) -> &str {
        match &self.kind {
            BlockKind::Heading { text, .. }
            | BlockKind::Paragraph { text }
            | BlockKind::ListItem { text, .. }
            | BlockKind::CodeBlock { text, .. }
            | BlockKind::Blockquote { text } => text,
            BlockKind::HorizontalRule => "",
        }
    }

    /// Heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            BlockKind::Heading { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading { .. })
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self.kind, BlockKind::ListItem { .. })
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph { .. })
    }
}
