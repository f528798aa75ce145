//! Structural parsing of raw code text into document blocks
//!
//! Recognizes the shapes building-code extractions come in: numbered
//! section headings (`3.1.2 Fire Separations`), markdown `#` headings,
//! `[page N]` markers, and `|`-delimited tables (re-rendered as Markdown
//! pipe tables so a table is chunked as one unit). Everything else folds
//! into paragraphs.

use regex::Regex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::document::{DocBlock, Document};

/// A structural defect that makes the document unreadable.
///
/// Scoped to one document: the build reports it by document id and keeps
/// processing the rest of the batch.
#[derive(Debug)]
pub struct ParseError {
    /// 1-indexed source line
    pub line: usize,
    /// What went wrong
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parse raw text into a document, failing with a document-scoped error
pub fn parse_document(
    title: impl Into<String>,
    source_file: impl Into<String>,
    text: &str,
) -> Result<Document> {
    let id = Uuid::new_v4();
    let source_file = source_file.into();

    let blocks = parse_blocks(text)
        .map_err(|e| Error::ingest(id, format!("{source_file}: {e}")))?;

    Ok(Document {
        id,
        title: title.into(),
        source_file,
        code_edition: None,
        blocks,
        ingested_at: chrono::Utc::now(),
    })
}

/// Parse raw text into structural blocks
pub fn parse_blocks(text: &str) -> std::result::Result<Vec<DocBlock>, ParseError> {
    let markdown_heading = Regex::new(r"^(#{1,6})\s+(.+)$").expect("static regex");
    let numbered_heading = Regex::new(r"^(\d+(?:\.\d+)*)\s+([A-Z][^.!?]*)$").expect("static regex");
    let section_number = Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+(.+)$").expect("static regex");
    let page_marker = Regex::new(r"^\[page\s+(\d+)\]$").expect("static regex");

    fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<DocBlock>, page: Option<u32>) {
        if !paragraph.is_empty() {
            blocks.push(DocBlock::Paragraph {
                text: paragraph.join(" "),
                page,
            });
            paragraph.clear();
        }
    }

    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut table: Vec<Vec<String>> = Vec::new();
    let mut table_start_line = 0usize;
    let mut page: Option<u32> = None;

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();

        // A table ends at the first non-table line.
        if !table.is_empty() && !line.starts_with('|') {
            blocks.push(render_table(std::mem::take(&mut table), table_start_line, page)?);
        }

        if line.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks, page);
            continue;
        }

        if let Some(caps) = page_marker.captures(line) {
            flush_paragraph(&mut paragraph, &mut blocks, page);
            let number: u32 = caps[1].parse().map_err(|_| ParseError {
                line: line_no,
                message: format!("page marker out of range: '{line}'"),
            })?;
            page = Some(number);
            continue;
        }

        if line.starts_with('|') {
            flush_paragraph(&mut paragraph, &mut blocks, page);
            if table.is_empty() {
                table_start_line = line_no;
            }
            if let Some(cells) = parse_table_row(line) {
                table.push(cells);
            }
            continue;
        }

        if let Some(caps) = markdown_heading.captures(line) {
            flush_paragraph(&mut paragraph, &mut blocks, page);
            let level = caps[1].len() as u8;
            let rest = caps[2].trim();
            let (label, title) = match section_number.captures(rest) {
                Some(num) => (num[1].to_string(), num[2].trim().to_string()),
                None => (rest.to_string(), rest.to_string()),
            };
            blocks.push(DocBlock::Heading { level, label, title });
            continue;
        }

        if line.len() <= 80 {
            if let Some(caps) = numbered_heading.captures(line) {
                flush_paragraph(&mut paragraph, &mut blocks, page);
                let number = caps[1].to_string();
                let level = number.split('.').count() as u8;
                blocks.push(DocBlock::Heading {
                    level,
                    label: number,
                    title: caps[2].trim().to_string(),
                });
                continue;
            }
        }

        paragraph.push(line);
    }

    flush_paragraph(&mut paragraph, &mut blocks, page);
    if !table.is_empty() {
        blocks.push(render_table(table, table_start_line, page)?);
    }

    backfill_pages(&mut blocks);
    Ok(blocks)
}

/// Split a `|`-delimited row into cells; `None` for separator rows
fn parse_table_row(line: &str) -> Option<Vec<String>> {
    let inner = line.trim_matches('|');
    let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_string()).collect();

    let is_separator = cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'));
    if is_separator {
        return None;
    }

    Some(cells)
}

/// Re-render rows as a Markdown pipe table, validating the shape
fn render_table(
    rows: Vec<Vec<String>>,
    start_line: usize,
    page: Option<u32>,
) -> std::result::Result<DocBlock, ParseError> {
    let width = rows[0].len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ParseError {
                line: start_line + i,
                message: format!(
                    "malformed table: row has {} cells, header has {width}",
                    row.len()
                ),
            });
        }
    }

    let row_to_md = |row: &[String]| format!("| {} |", row.join(" | "));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(row_to_md(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    for row in &rows[1..] {
        lines.push(row_to_md(row));
    }

    Ok(DocBlock::Table {
        text: lines.join("\n"),
        page,
    })
}

/// Give blocks seen before the first page marker that marker's page
fn backfill_pages(blocks: &mut [DocBlock]) {
    let first_page = blocks.iter().find_map(DocBlock::page);
    let Some(first_page) = first_page else {
        return;
    };

    for block in blocks.iter_mut() {
        match block {
            DocBlock::Paragraph { page, .. } | DocBlock::Table { page, .. } => {
                if page.is_none() {
                    *page = Some(first_page);
                } else {
                    // Pages are monotonic; once markers start, nothing is missing.
                    break;
                }
            }
            DocBlock::Heading { .. } => {}
        }
    }
}
