//! Splitting documents into overlap-aware chunks
//!
//! Sizes are measured in whitespace-separated words. Text is first split
//! into paragraphs (blank-line separated); paragraphs that are too long are
//! split into sentences, and sentences that are still too long are split
//! every N words. Units are then packed greedily into chunks, each chunk
//! after the first starting with the tail words of its predecessor.
//!
//! Chunks are slices of the document text, so paragraph breaks and
//! punctuation survive and `start..end` always indexes the source.

use clausal_domain::{Chunk, ChunkId, Document};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default maximum words per chunk
pub const DEFAULT_MAX_WORDS: usize = 1000;

/// Default words carried from one chunk into the next
pub const DEFAULT_OVERLAP_WORDS: usize = 200;

/// Chunk size parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum words per chunk, overlap included
    pub max_words: usize,
    /// Words carried from the tail of one chunk into the head of the next
    pub overlap_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
        }
    }
}

/// A word located in the document text
#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
}

/// Deterministic document chunker
#[derive(Debug, Clone)]
pub struct Chunker {
    max_words: usize,
    overlap_words: usize,
}

impl Chunker {
    /// Create a chunker
    ///
    /// `max_words` is raised to at least 1 and `overlap_words` is capped
    /// below `max_words`, so chunking always makes progress.
    pub fn new(max_words: usize, overlap_words: usize) -> Self {
        let max_words = max_words.max(1);
        Self {
            max_words,
            overlap_words: overlap_words.min(max_words - 1),
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_words, config.overlap_words)
    }

    /// Maximum words per chunk
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Overlap in words
    pub fn overlap_words(&self) -> usize {
        self.overlap_words
    }

    /// Split a document into chunks
    ///
    /// Empty documents yield no chunks; documents of at most `max_words`
    /// words yield exactly one.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.as_str();
        let words = locate_words(text);
        if words.is_empty() {
            return Vec::new();
        }

        let units = self.units(text, &words);
        let ranges = self.pack(&units);

        ranges
            .into_iter()
            .enumerate()
            .map(|(sequence, (range, overlap))| {
                let start = words[range.start].start;
                let end = words[range.end - 1].end;
                Chunk {
                    id: ChunkId::new(&document.id, sequence),
                    document_id: document.id.clone(),
                    sequence,
                    text: text[start..end].to_string(),
                    start,
                    end,
                    word_count: range.len(),
                    overlap_words: overlap,
                }
            })
            .collect()
    }

    /// Words available for new content in a chunk that carries full overlap
    fn unit_cap(&self) -> usize {
        self.max_words - self.overlap_words
    }

    /// Split the word list into paragraph, sentence, or hard-split units
    fn units(&self, text: &str, words: &[Word]) -> Vec<Range<usize>> {
        let cap = self.unit_cap();
        let mut units = Vec::new();

        for paragraph in split_where(words.len(), |i| is_paragraph_break(text, words, i)) {
            if paragraph.len() <= cap {
                units.push(paragraph);
                continue;
            }
            let offset = paragraph.start;
            let sentence_ends = |i: usize| {
                let word = words[offset + i - 1];
                ends_sentence(&text[word.start..word.end])
            };
            for sentence in split_where(paragraph.len(), sentence_ends) {
                let sentence = (paragraph.start + sentence.start)..(paragraph.start + sentence.end);
                if sentence.len() <= cap {
                    units.push(sentence);
                } else {
                    units.extend(hard_split(sentence, cap));
                }
            }
        }

        units
    }

    /// Pack units into chunk word ranges, returning each range with its overlap
    fn pack(&self, units: &[Range<usize>]) -> Vec<(Range<usize>, usize)> {
        let mut chunks: Vec<(Range<usize>, usize)> = Vec::new();
        let mut iter = units.iter().peekable();
        let mut prev_body = 0usize;

        while let Some(first) = iter.next() {
            let overlap = match chunks.last() {
                Some(_) => self.overlap_words.min(prev_body),
                None => 0,
            };
            let start = first.start - overlap;
            let mut end = first.end;

            while let Some(next) = iter.peek() {
                if next.end - start > self.max_words {
                    break;
                }
                end = next.end;
                iter.next();
            }

            prev_body = end - first.start;
            chunks.push((start..end, overlap));
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORDS, DEFAULT_OVERLAP_WORDS)
    }
}

fn locate_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push(Word { start: s, end: i });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push(Word { start: s, end: text.len() });
    }

    words
}

/// True when a blank line separates word `i - 1` from word `i`
fn is_paragraph_break(text: &str, words: &[Word], i: usize) -> bool {
    let gap = &text[words[i - 1].end..words[i].start];
    gap.matches('\n').count() >= 2
}

fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(['"', '\'', ')', ']'])
        .ends_with(['.', '!', '?', ';'])
}

/// Split `0..len` before every index `i` (1..len) where `boundary(i)` holds
fn split_where(len: usize, boundary: impl Fn(usize) -> bool) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..len {
        if boundary(i) {
            ranges.push(start..i);
            start = i;
        }
    }
    if start < len {
        ranges.push(start..len);
    }
    ranges
}

fn hard_split(range: Range<usize>, cap: usize) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = range.start;
    while start < range.end {
        let end = (start + cap).min(range.end);
        pieces.push(start..end);
        start = end;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausal_domain::ContentType;
    use proptest::prelude::*;

    fn doc(text: &str) -> Document {
        Document::new("test.txt", text, ContentType::PlainText, 0)
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let chunker = Chunker::new(10, 2);
        assert!(chunker.chunk(&doc("")).is_empty());
        assert!(chunker.chunk(&doc("  \n\n  ")).is_empty());
    }

    #[test]
    fn test_short_document_yields_one_chunk() {
        let chunker = Chunker::new(100, 20);
        let text = "1. Coverage\n\nThe policy covers hospitalisation.\n\n2. Exclusions\n\nCosmetic surgery.";
        let chunks = chunker.chunk(&doc(text));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, text.len());
        assert_eq!(chunks[0].overlap_words, 0);
    }

    #[test]
    fn test_paragraphs_packed_until_limit() {
        let chunker = Chunker::new(6, 0);
        let text = "a b c\n\nd e f\n\ng h";
        let chunks = chunker.chunk(&doc(text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "a b c\n\nd e f");
        assert_eq!(chunks[1].text, "g h");
    }

    #[test]
    fn test_overlap_carries_tail_words() {
        let chunker = Chunker::new(5, 2);
        let text = "one two three\n\nfour five six\n\nseven eight nine";
        let chunks = chunker.chunk(&doc(text));
        assert_eq!(chunks[0].text, "one two three");
        assert!(chunks[1].text.starts_with("two three"));
        assert_eq!(chunks[1].overlap_words, 2);
        for chunk in &chunks {
            assert!(chunk.word_count <= 5);
        }
    }

    #[test]
    fn test_long_paragraph_split_on_sentences() {
        let chunker = Chunker::new(6, 0);
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota.";
        let chunks = chunker.chunk(&doc(text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Alpha beta gamma. Delta epsilon zeta.");
        assert_eq!(chunks[1].text, "Eta theta iota.");
    }

    #[test]
    fn test_long_sentence_hard_split() {
        let chunker = Chunker::new(4, 1);
        let text = words(10);
        let chunks = chunker.chunk(&doc(&text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.word_count <= 4, "chunk too large: {}", chunk.word_count);
        }
        let last = chunks.last().unwrap();
        assert!(last.text.ends_with("w9"));
    }

    #[test]
    fn test_offsets_index_source_text() {
        let chunker = Chunker::new(3, 1);
        let d = doc("α β γ\n\nδ ε ζ\n\nη θ");
        for chunk in chunker.chunk(&d) {
            assert_eq!(&d.text[chunk.start..chunk.end], chunk.text);
        }
    }

    #[test]
    fn test_chunk_ids_follow_sequence() {
        let chunker = Chunker::new(2, 0);
        let d = doc("a b c d e");
        let chunks = chunker.chunk(&d);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence, i);
            assert_eq!(chunk.id, ChunkId::new(&d.id, i));
            assert_eq!(chunk.document_id, d.id);
        }
    }

    #[test]
    fn test_overlap_capped_below_max() {
        let chunker = Chunker::new(3, 10);
        assert_eq!(chunker.overlap_words(), 2);
        let chunks = chunker.chunk(&doc(&words(9)));
        assert!(chunks.iter().all(|c| c.word_count <= 3));
        assert!(chunks.last().unwrap().text.ends_with("w8"));
    }

    proptest! {
        #[test]
        fn prop_chunking_is_deterministic(
            text in "[a-z .\n]{0,400}",
            max in 1usize..40,
            overlap in 0usize..20,
        ) {
            let chunker = Chunker::new(max, overlap);
            let d = doc(&text);
            prop_assert_eq!(chunker.chunk(&d), chunker.chunk(&d));
        }

        #[test]
        fn prop_chunks_bounded_and_cover_all_words(
            text in "[a-z .\n]{0,400}",
            max in 1usize..40,
            overlap in 0usize..20,
        ) {
            let chunker = Chunker::new(max, overlap);
            let d = doc(&text);
            let chunks = chunker.chunk(&d);
            let total_words = d.text.split_whitespace().count();

            let mut new_words = 0;
            for chunk in &chunks {
                prop_assert!(chunk.word_count <= chunker.max_words());
                prop_assert!(chunk.word_count > chunk.overlap_words);
                prop_assert_eq!(chunk.text.split_whitespace().count(), chunk.word_count);
                new_words += chunk.word_count - chunk.overlap_words;
            }
            prop_assert_eq!(new_words, total_words);
        }
    }
}
