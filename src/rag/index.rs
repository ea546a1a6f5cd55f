//! In-memory vector index and top-k retriever.

use std::cmp::Ordering;

use serde::Serialize;

use super::chunker::Chunk;

/// A chunk paired with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Immutable mapping from chunks to embeddings for one document.
///
/// Rebuilt wholesale on each ingestion; there is no in-place update.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Self {
        if chunks.len() != embeddings.len() {
            tracing::warn!(
                "Chunk/embedding count mismatch ({} vs {}), extra entries dropped",
                chunks.len(),
                embeddings.len()
            );
        }
        Self {
            entries: chunks.into_iter().zip(embeddings).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k chunks by descending cosine similarity.
    ///
    /// Ties keep original chunk order (the sort is stable), so results are
    /// deterministic. Returns fewer than `k` results only when the index
    /// holds fewer than `k` chunks; an empty index yields an empty result.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// A vector index with a fixed result count.
#[derive(Debug)]
pub struct Retriever {
    index: VectorIndex,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: VectorIndex, top_k: usize) -> Self {
        Self { index, top_k }
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn search(&self, query_embedding: &[f32]) -> Vec<ScoredChunk> {
        self.index.search(query_embedding, self.top_k)
    }
}

/// Cosine similarity in `[-1.0, 1.0]`; zero for empty or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::chunker::{split, ChunkerConfig};

    fn chunks_for(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut chunk = split(text, "doc.txt", &ChunkerConfig::default())
                    .into_iter()
                    .next()
                    .expect("chunk");
                chunk.chunk_index = i;
                chunk
            })
            .collect()
    }

    #[test]
    fn cosine_identical_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_mismatched_lengths_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn search_orders_by_similarity() {
        let chunks = chunks_for(&["about cats", "about dogs", "about birds"]);
        let embeddings = vec![vec![0.9, 0.1], vec![0.1, 0.9], vec![0.7, 0.3]];
        let index = VectorIndex::build(chunks, embeddings);

        let results = index.search(&[1.0, 0.0], 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.text, "about cats");
        assert_eq!(results[1].chunk.text, "about birds");
        assert_eq!(results[2].chunk.text, "about dogs");
    }

    #[test]
    fn search_never_exceeds_k() {
        let chunks = chunks_for(&["one", "two", "three"]);
        let embeddings = vec![vec![1.0, 0.0]; 3];
        let index = VectorIndex::build(chunks, embeddings);

        assert_eq!(index.search(&[1.0, 0.0], 2).len(), 2);
        assert_eq!(index.search(&[1.0, 0.0], 10).len(), 3);
    }

    #[test]
    fn ties_break_toward_earlier_chunks() {
        let chunks = chunks_for(&["first", "second", "third"]);
        let embeddings = vec![vec![1.0, 0.0]; 3];
        let index = VectorIndex::build(chunks, embeddings);

        let results = index.search(&[1.0, 0.0], 3);
        let order: Vec<usize> = results.iter().map(|r| r.chunk.chunk_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::default();
        assert!(index.search(&[1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn zero_embedding_ranks_last() {
        let chunks = chunks_for(&["real", "failed"]);
        let embeddings = vec![vec![0.5, 0.5], vec![0.0, 0.0]];
        let index = VectorIndex::build(chunks, embeddings);

        let results = index.search(&[1.0, 1.0], 2);
        assert_eq!(results[0].chunk.text, "real");
        assert_eq!(results[1].score, 0.0);
    }
}
