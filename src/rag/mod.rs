//! Retrieval pipeline: chunking, embedding, and similarity search.

pub mod chunker;
pub mod embedder;
pub mod index;
pub mod prompt;

pub use chunker::{Chunk, ChunkerConfig};
pub use embedder::EmbeddingService;
pub use index::{Retriever, ScoredChunk, VectorIndex};
