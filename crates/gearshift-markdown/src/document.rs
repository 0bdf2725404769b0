//! Parsed documents with file metadata.

use crate::error::{DocumentError, ParseError};
use crate::node::BlockNode;
use crate::parser::parse;
use crate::query::{find_section, Section, SectionQuery};
use gearshift_common_core::Timestamp;
use gearshift_common_fs as fs;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// File-level facts about a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    /// File name without directories.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when known.
    pub modified: Option<Timestamp>,
    /// Lowercase hex SHA-256 of the text.
    pub checksum: String,
}

/// An immutable parsed markdown document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub path: PathBuf,
    pub raw: String,
    pub nodes: Vec<BlockNode>,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Parse in-memory text; `path` only labels the document.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let raw = text.into();
        let nodes = parse(&raw)?;

        let metadata = DocumentMetadata {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: raw.len() as u64,
            modified: None,
            checksum: checksum(&raw),
        };

        Ok(Self {
            path,
            raw,
            nodes,
            metadata,
        })
    }

    /// Read and parse a file no larger than `max_bytes`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let info = fs::stat(path)?;
        let text = fs::read_to_string(path, max_bytes)?;
        Self::from_file(path, text, info)
    }

    /// Async variant of [`Document::load`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load_async(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let info = fs::nonblocking::stat(path).await?;
        let text = fs::nonblocking::read_to_string(path, max_bytes).await?;
        Self::from_file(path, text, info)
    }

    fn from_file(path: &Path, text: String, info: fs::FileInfo) -> Result<Self, DocumentError> {
        let mut doc = Self::parse(path, text)?;
        doc.metadata.size = info.size;
        doc.metadata.modified = info.modified.map(Timestamp::from);
        debug!(nodes = doc.nodes.len(), size = info.size, "document loaded");
        Ok(doc)
    }

    /// First section whose heading matches `query`.
    pub fn find_section(&self, query: &SectionQuery) -> Option<Section<'_>> {
        find_section(&self.nodes, query)
    }
}

fn checksum(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
