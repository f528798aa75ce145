//! Text chunking over structural blocks
//!
//! Greedy accumulation up to the target size, breaking at block boundaries,
//! with the tail of each chunk re-seeding the head of the next. Chunk
//! offsets are byte ranges into the document's canonical text, so every
//! chunk's text is an exact slice of it.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::chunk::Chunk;
use crate::types::document::{DocBlock, Document, BLOCK_SEPARATOR};

/// One packable unit: a content block, or a forced piece of one
struct Segment {
    start: usize,
    end: usize,
    page: Option<u32>,
    forced: bool,
    section_path: Vec<String>,
    /// First segment after a heading; overlap never crosses it
    new_section: bool,
}

impl Segment {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits documents into bounded, citable chunks.
///
/// Assumes a validated [`ChunkingConfig`]; the build pipeline rejects
/// invalid configuration before any document reaches the chunker.
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a chunker with the given configuration
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Chunk a document; an empty document yields no chunks
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        let canonical = doc.canonical_text();
        let segments = self.collect_segments(doc);

        let mut chunks: Vec<Chunk> = Vec::new();
        // End offset of the previously emitted chunk, and how much of its
        // tail may seed the next one.
        let mut prev_end = 0usize;
        let mut pending_seed = 0usize;

        let mut i = 0;
        while i < segments.len() {
            let seg = &segments[i];
            if seg.new_section {
                pending_seed = 0;
            }

            let limit = if seg.forced {
                self.config.hard_limit()
            } else {
                self.config.chunk_size
            };

            let gap = seg.start - prev_end;
            let budget = limit.saturating_sub(seg.len() + gap);
            let seed = snap_seed(&canonical, prev_end, pending_seed.min(budget));
            let start = if seed > 0 { prev_end - seed } else { seg.start };

            let mut end = seg.end;
            let mut j = i + 1;
            if !seg.forced {
                while j < segments.len()
                    && !segments[j].forced
                    && !segments[j].new_section
                    && segments[j].end - start <= self.config.chunk_size
                {
                    end = segments[j].end;
                    j += 1;
                }
            }

            chunks.push(Chunk::new(
                doc.id,
                canonical[start..end].to_string(),
                seg.section_path.clone(),
                start,
                end,
                seg.page,
                chunks.len() as u32,
                seg.forced,
            ));

            prev_end = end;
            pending_seed = self.config.chunk_overlap.min(end - start);
            i = j;
        }

        tracing::debug!(
            document = %doc.id,
            chunks = chunks.len(),
            "document chunked"
        );
        chunks
    }

    /// Walk blocks maintaining the heading stack, pre-splitting any block
    /// that alone exceeds the target size
    fn collect_segments(&self, doc: &Document) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut stack: Vec<(u8, String)> = Vec::new();
        let mut offset = 0usize;
        let mut section_break = false;

        for block in &doc.blocks {
            if let DocBlock::Heading { level, label, .. } = block {
                while stack.last().is_some_and(|(l, _)| *l >= *level) {
                    stack.pop();
                }
                stack.push((*level, label.clone()));
                section_break = true;
                continue;
            }

            let Some(text) = block.content() else { continue };
            if text.is_empty() {
                continue;
            }

            let start = if offset == 0 {
                0
            } else {
                offset + BLOCK_SEPARATOR.len()
            };
            let path: Vec<String> = stack.iter().map(|(_, label)| label.clone()).collect();
            let page = block.page();

            if text.len() > self.config.chunk_size {
                for (k, (rel_start, rel_end)) in self.split_oversized(text).into_iter().enumerate() {
                    segments.push(Segment {
                        start: start + rel_start,
                        end: start + rel_end,
                        page,
                        forced: true,
                        section_path: path.clone(),
                        new_section: section_break && k == 0,
                    });
                }
            } else {
                segments.push(Segment {
                    start,
                    end: start + text.len(),
                    page,
                    forced: false,
                    section_path: path,
                    new_section: section_break,
                });
            }

            section_break = false;
            offset = start + text.len();
        }

        segments
    }

    /// Split an oversized block into pieces at sentence boundaries,
    /// falling back to a hard cut at the size limit when a single sentence
    /// leaves no boundary to break at
    fn split_oversized(&self, text: &str) -> Vec<(usize, usize)> {
        let chunk_size = self.config.chunk_size;
        let mut pieces = Vec::new();
        let mut piece_start = 0usize;
        let mut cursor = 0usize;

        for sentence in text.split_sentence_bounds() {
            let len = sentence.len();

            if cursor > piece_start && cursor - piece_start + len > chunk_size {
                pieces.push((piece_start, cursor));
                piece_start = cursor;
            }

            if len > chunk_size {
                let sentence_end = cursor + len;
                let mut at = cursor;
                while sentence_end - at > chunk_size {
                    let mut cut = at + chunk_size;
                    while !text.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    pieces.push((at, cut));
                    at = cut;
                }
                piece_start = at;
                cursor = sentence_end;
            } else {
                cursor += len;
            }
        }

        if cursor > piece_start {
            pieces.push((piece_start, cursor));
        }

        // A trailing sliver reads better merged into the previous piece.
        if pieces.len() >= 2 {
            let last = pieces[pieces.len() - 1];
            if last.1 - last.0 < self.config.min_chunk_size {
                pieces.pop();
                let prev = pieces.last_mut().expect("at least one piece remains");
                prev.1 = last.1;
            }
        }

        pieces
    }
}

/// Clamp an overlap seed to `max_len` bytes of the text ending at `end`,
/// snapped forward to a character and word boundary
fn snap_seed(canonical: &str, end: usize, max_len: usize) -> usize {
    if max_len == 0 || end == 0 {
        return 0;
    }

    let mut start = end - max_len.min(end);
    while start < end && !canonical.is_char_boundary(start) {
        start += 1;
    }

    // Prefer starting just after a word boundary.
    if let Some(pos) = canonical[start..end].find(' ') {
        start += pos + 1;
    }

    end - start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::document::DocBlock;

    fn config(chunk_size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
            min_chunk_size: 10,
        }
    }

    fn paragraph(text: &str) -> DocBlock {
        DocBlock::Paragraph {
            text: text.to_string(),
            page: None,
        }
    }

    fn heading(level: u8, label: &str) -> DocBlock {
        DocBlock::Heading {
            level,
            label: label.to_string(),
            title: format!("Title {label}"),
        }
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = TextChunker::new(&config(100, 10));
        let doc = Document::new("empty", "e.txt", Vec::new());
        assert!(chunker.chunk_document(&doc).is_empty());
    }

    #[test]
    fn small_document_is_one_chunk() {
        let chunker = TextChunker::new(&config(200, 20));
        let doc = Document::new("d", "d.txt", vec![paragraph("Short paragraph."), paragraph("Another one.")]);

        let chunks = chunker.chunk_document(&doc);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Short paragraph.\n\nAnother one.");
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].char_end, doc.canonical_text().len());
        assert!(!chunks[0].forced_split);
    }

    #[test]
    fn chunks_are_exact_slices_of_canonical_text() {
        let chunker = TextChunker::new(&config(80, 16));
        let doc = Document::new(
            "d",
            "d.txt",
            vec![
                heading(1, "3"),
                paragraph("The first provision covers combustible construction in detail."),
                paragraph("The second provision covers noncombustible construction instead."),
                paragraph("The third provision addresses sprinkler requirements for both."),
            ],
        );

        let canonical = doc.canonical_text();
        let chunks = chunker.chunk_document(&doc);
        assert!(chunks.len() > 1);

        for chunk in &chunks {
            assert_eq!(chunk.text, &canonical[chunk.char_start..chunk.char_end]);
            assert!(!chunk.text.is_empty());
            // The document has a heading, so every chunk is attributable.
            assert!(!chunk.section_path.is_empty());
        }

        // Coverage: starts at 0, ends at the end, no gap wider than the
        // block separator between consecutive chunks.
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks.last().unwrap().char_end, canonical.len());
        for pair in chunks.windows(2) {
            assert!(pair[1].char_start <= pair[0].char_end + BLOCK_SEPARATOR.len());
        }
    }

    #[test]
    fn non_forced_chunks_respect_the_target_size() {
        let chunker = TextChunker::new(&config(90, 20));
        let sentences = "Rated assemblies shall be tested. Listed assemblies may be used. \
                         Field-erected assemblies need review. Shop drawings are required.";
        let doc = Document::new("d", "d.txt", vec![heading(1, "4"), paragraph(sentences)]);

        for chunk in chunker.chunk_document(&doc) {
            if !chunk.forced_split {
                assert!(chunk.text.len() <= 90, "chunk of {} bytes", chunk.text.len());
            } else {
                assert!(chunk.text.len() <= 180);
            }
        }
    }

    #[test]
    fn oversized_paragraph_is_force_split_and_flagged() {
        let chunker = TextChunker::new(&config(50, 10));
        // One long sentence: no boundary to break at.
        let long = "a".repeat(170);
        let doc = Document::new("d", "d.txt", vec![paragraph(&long)]);

        let chunks = chunker.chunk_document(&doc);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.forced_split);
            assert!(chunk.text.len() <= chunker.config.hard_limit());
        }
        assert_eq!(chunks.last().unwrap().char_end, 170);
    }

    #[test]
    fn overlap_reappears_at_the_head_of_the_next_chunk() {
        let chunker = TextChunker::new(&config(60, 20));
        let doc = Document::new(
            "d",
            "d.txt",
            vec![
                paragraph("Fire dampers are required in ducted systems."),
                paragraph("Smoke dampers stop smoke migration in shafts."),
            ],
        );

        let chunks = chunker.chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].char_start < chunks[0].char_end);
        // The second chunk begins with the tail of the first.
        let overlap_len = chunks[0].char_end - chunks[1].char_start;
        assert!(overlap_len > 0 && overlap_len <= 20);
        assert!(chunks[0].text.ends_with(&chunks[1].text[..overlap_len]));
    }

    #[test]
    fn section_path_follows_the_heading_stack() {
        let chunker = TextChunker::new(&config(500, 50));
        let doc = Document::new(
            "d",
            "d.txt",
            vec![
                heading(2, "3.1"),
                heading(3, "3.1.2"),
                paragraph("Fire separations between dwelling units shall be rated."),
                heading(3, "3.1.3"),
                paragraph("Closures in fire separations shall be protected."),
            ],
        );

        let chunks = chunker.chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section_path, vec!["3.1", "3.1.2"]);
        assert_eq!(chunks[1].section_path, vec!["3.1", "3.1.3"]);
    }

    #[test]
    fn headings_never_share_a_chunk_across_sections() {
        let chunker = TextChunker::new(&config(1000, 100));
        let doc = Document::new(
            "d",
            "d.txt",
            vec![
                heading(1, "1"),
                paragraph("Scope of this part."),
                heading(1, "2"),
                paragraph("Referenced documents."),
            ],
        );

        let chunks = chunker.chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section_path, vec!["1"]);
        assert_eq!(chunks[1].section_path, vec!["2"]);
        // No overlap carries across a section break.
        assert!(chunks[1].char_start > chunks[0].char_end);
    }

    #[test]
    fn pages_are_carried_from_blocks() {
        let chunker = TextChunker::new(&config(500, 50));
        let doc = Document::new(
            "d",
            "d.txt",
            vec![DocBlock::Paragraph {
                text: "Provision text.".to_string(),
                page: Some(41),
            }],
        );
        assert_eq!(chunker.chunk_document(&doc)[0].page, Some(41));
    }

    #[test]
    fn chunk_ids_are_stable_across_rebuilds() {
        let chunker = TextChunker::new(&config(200, 20));
        let doc = Document::new("d", "d.txt", vec![paragraph("Identical content.")]);

        let first = chunker.chunk_document(&doc);
        let second = chunker.chunk_document(&doc);
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn multibyte_text_never_splits_inside_a_character() {
        let chunker = TextChunker::new(&config(20, 4));
        let doc = Document::new("d", "d.txt", vec![paragraph(&"é".repeat(40))]);

        for chunk in chunker.chunk_document(&doc) {
            // Slicing would have panicked on a bad boundary; also verify
            // the text round-trips as valid UTF-8 content.
            assert!(chunk.text.chars().all(|c| c == 'é'));
        }
    }
}
