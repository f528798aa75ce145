//! Source documents and their structural blocks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One structural unit of a parsed document.
///
/// Headings carry section structure only; paragraph and table blocks carry
/// the citable text the chunker covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocBlock {
    /// Section heading, e.g. number `"3.1.2"`, title `"Fire Separations"`
    Heading {
        /// Nesting depth, 1 = top level
        level: u8,
        /// Section label used in citations; the section number when the
        /// heading has one, otherwise the heading title
        label: String,
        /// Heading title text
        title: String,
    },
    /// Body paragraph
    Paragraph {
        text: String,
        /// Page the paragraph starts on, when the source tracks pages
        page: Option<u32>,
    },
    /// Table rendered to a Markdown pipe table
    Table {
        /// Markdown rendering, chunked as one unit
        text: String,
        page: Option<u32>,
    },
}

impl DocBlock {
    /// Citable text of this block; headings contribute none
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Heading { .. } => None,
            Self::Paragraph { text, .. } | Self::Table { text, .. } => Some(text),
        }
    }

    /// Page tracked for this block, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Heading { .. } => None,
            Self::Paragraph { page, .. } | Self::Table { page, .. } => *page,
        }
    }
}

/// A source document after structural parsing.
///
/// Immutable once created; a corpus change means re-running the build over
/// fresh documents rather than editing these in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document id
    pub id: Uuid,
    /// Human-readable title
    pub title: String,
    /// Provenance: the file the text came from
    pub source_file: String,
    /// Code edition, e.g. "NBC 2020"
    pub code_edition: Option<String>,
    /// Structural blocks in document order
    pub blocks: Vec<DocBlock>,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

/// Separator between blocks in the canonical text stream
pub(crate) const BLOCK_SEPARATOR: &str = "\n\n";

impl Document {
    /// Create a document from pre-parsed blocks
    pub fn new(title: impl Into<String>, source_file: impl Into<String>, blocks: Vec<DocBlock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            source_file: source_file.into(),
            code_edition: None,
            blocks,
            ingested_at: Utc::now(),
        }
    }

    /// Set the code edition
    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.code_edition = Some(edition.into());
        self
    }

    /// The canonical text stream chunk offsets refer into: all content
    /// blocks joined by [`BLOCK_SEPARATOR`], headings excluded.
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            if let Some(text) = block.content() {
                if text.is_empty() {
                    continue;
                }
                if !out.is_empty() {
                    out.push_str(BLOCK_SEPARATOR);
                }
                out.push_str(text);
            }
        }
        out
    }

    /// Whether the document has any heading block
    pub fn has_headings(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, DocBlock::Heading { .. }))
    }
}
