//! Overlapping text chunker.
//!
//! Splits document text into chunks of at most `chunk_size` characters,
//! with `chunk_overlap` characters shared between neighbors so a concept
//! spanning a boundary remains retrievable from at least one chunk.
//! Windows prefer to end at a sentence boundary, falling back to a line
//! break and then to a hard character cut.

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Chunking parameters. Lengths are measured in characters and stay fixed
/// for the lifetime of an index.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// A contiguous piece of a document, the unit of retrieval.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub id: String,
    /// Source identifier of the owning document (file path or name).
    pub source: String,
    pub chunk_index: usize,
    /// Character offset of this chunk within the document text.
    pub start_offset: usize,
    pub text: String,
    /// SHA-256 of the chunk text, hex encoded.
    pub hash: String,
}

/// Split text into overlapping chunks covering the whole input.
///
/// Every chunk except the last starts `chunk_size - chunk_overlap` (or
/// fewer, after a boundary adjustment) characters past its predecessor,
/// so each character of the input belongs to at least one chunk.
/// Deterministic for identical input and parameters. Whitespace-only
/// input yields no chunks.
pub fn split(text: &str, source: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chunk_size = config.chunk_size.max(1);
    let overlap = config.chunk_overlap.min(chunk_size - 1);

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0;

    while start < total {
        let hard_end = (start + chunk_size).min(total);
        let end = if hard_end < total {
            sentence_cut(&chars, start, hard_end)
        } else {
            hard_end
        };

        let piece: String = chars[start..end].iter().collect();
        chunks.push(make_chunk(source, chunk_index, start, piece));
        chunk_index += 1;

        if end == total {
            break;
        }
        // Overlap never swallows the whole chunk, so the window always advances.
        start = (end.saturating_sub(overlap)).max(start + 1);
    }

    chunks
}

/// Pick a cut point in the last 20% of the window: after a sentence
/// ending if one exists, else after the last line break, else the hard cut.
fn sentence_cut(chars: &[char], start: usize, hard_end: usize) -> usize {
    let window = hard_end - start;
    let search_from = start + window * 80 / 100;
    let mut newline_cut = None;

    for i in (search_from..hard_end).rev() {
        if chars[i].is_whitespace() && i > start && matches!(chars[i - 1], '.' | '!' | '?') {
            return i + 1;
        }
        if newline_cut.is_none() && chars[i] == '\n' {
            newline_cut = Some(i + 1);
        }
    }

    newline_cut.unwrap_or(hard_end)
}

fn make_chunk(source: &str, chunk_index: usize, start_offset: usize, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        source: source.to_string(),
        chunk_index,
        start_offset,
        text,
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkerConfig {
        ChunkerConfig {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Rebuild the document from chunks by dropping each chunk's overlap
    /// with its predecessor.
    fn reconstruct(chunks: &[Chunk]) -> String {
        let mut out = String::new();
        let mut covered = 0;
        for chunk in chunks {
            let len = chunk.text.chars().count();
            let skip = covered - chunk.start_offset;
            out.extend(chunk.text.chars().skip(skip));
            covered = chunk.start_offset + len;
        }
        out
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = split("Alpha. Beta. Gamma.", "doc.txt", &config(1000, 150));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].text, "Alpha. Beta. Gamma.");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split("", "doc.txt", &config(1000, 150)).is_empty());
        assert!(split("   \n\t ", "doc.txt", &config(1000, 150)).is_empty());
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let text = "word ".repeat(400);
        for (size, overlap) in [(50, 10), (100, 30), (1000, 150)] {
            for chunk in split(&text, "doc.txt", &config(size, overlap)) {
                assert!(
                    chunk.text.chars().count() <= size,
                    "chunk of {} chars exceeds limit {}",
                    chunk.text.chars().count(),
                    size
                );
            }
        }
    }

    #[test]
    fn chunks_cover_text_without_gaps() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = split(&text, "doc.txt", &config(120, 25));
        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = "abcdefghij".repeat(30);
        let chunks = split(&text, "doc.txt", &config(50, 10));
        for pair in chunks.windows(2) {
            let prev_end = pair[0].start_offset + pair[0].text.chars().count();
            assert!(pair[1].start_offset < prev_end, "gap between chunks");
            assert!(pair[1].start_offset > pair[0].start_offset, "no progress");
        }
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let text = format!("{} End of sentence. {}", "x".repeat(80), "y".repeat(80));
        let chunks = split(&text, "doc.txt", &config(100, 10));
        assert!(chunks[0].text.trim_end().ends_with("End of sentence."));
    }

    #[test]
    fn split_is_deterministic() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph. ".repeat(20);
        let first = split(&text, "doc.txt", &config(90, 20));
        let second = split(&text, "doc.txt", &config(90, 20));
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.hash, b.hash);
            assert_eq!(a.start_offset, b.start_offset);
        }
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let text = "Sentence one. Sentence two. Sentence three. ".repeat(25);
        let chunks = split(&text, "doc.txt", &config(80, 15));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[test]
    fn overlap_larger_than_chunk_size_still_terminates() {
        let text = "abcdef".repeat(50);
        let chunks = split(&text, "doc.txt", &config(10, 100));
        assert!(!chunks.is_empty());
        assert_eq!(reconstruct(&chunks), text);
    }
}
