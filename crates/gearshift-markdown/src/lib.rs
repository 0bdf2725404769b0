//! Block-level markdown parsing for analysis documents.
//!
//! The grammar is deliberately small: headings, paragraphs, list items,
//! fenced code, blockquotes and horizontal rules. Nodes are kept flat;
//! sections are computed on demand by comparing heading levels.

pub mod document;
pub mod error;
pub mod node;
pub mod parser;
pub mod query;

pub use document::{Document, DocumentMetadata};
pub use error::{DocumentError, ParseError};
pub use node::{BlockKind, BlockNode};
pub use parser::parse;
pub use query::{
    extract_code_blocks, extract_headings, extract_list_items, find_all_sections, find_section,
    following_list, section_text, CodeBlockRef, Section, SectionQuery,
};
