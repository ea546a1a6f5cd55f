use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rag::prompt::ChainStrategy;

/// Runtime configuration for the QA pipeline.
///
/// Loaded once at startup from an optional YAML file; every field has a
/// default so a missing or partial file still yields a working service.
/// Chunking parameters are fixed for the lifetime of an index; changing
/// them requires re-ingesting the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the local Ollama instance.
    pub ollama_url: String,
    /// Model used for question condensation and answer generation.
    pub chat_model: String,
    /// Model used for embedding chunks and queries.
    pub embedding_model: String,
    /// Dimensionality of the embedding vectors (zero-vector fallback size).
    pub embedding_dims: usize,
    /// Timeout for a single embedding request, in seconds.
    pub embedding_timeout_secs: u64,
    /// Timeout for a chat completion request, in seconds.
    pub chat_timeout_secs: u64,
    /// Maximum chunk length, in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// How retrieved chunks are combined into the answer prompt.
    pub chain_strategy: ChainStrategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.1".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dims: 768,
            embedding_timeout_secs: 60,
            chat_timeout_secs: 120,
            chunk_size: 1000,
            chunk_overlap: 150,
            top_k: 1,
            chain_strategy: ChainStrategy::Stuff,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file is absent or unparseable.
    pub fn load(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(raw) => match serde_yaml::from_str::<AppConfig>(&raw) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("Invalid config at {}: {}", path.display(), err);
                    AppConfig::default()
                }
            },
            Err(_) => AppConfig::default(),
        };

        config.validated()
    }

    /// Clamp fields into ranges the pipeline can operate with.
    ///
    /// Overlap must stay strictly below chunk size or the chunker could
    /// never advance; top_k of zero would make every answer ungrounded.
    pub fn validated(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        if self.chunk_overlap >= self.chunk_size {
            tracing::warn!(
                "chunk_overlap {} >= chunk_size {}, clamping",
                self.chunk_overlap,
                self.chunk_size
            );
            self.chunk_overlap = self.chunk_size - 1;
        }
        self.top_k = self.top_k.max(1);
        self.embedding_dims = self.embedding_dims.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_pipeline() {
        let config = AppConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 150);
        assert_eq!(config.top_k, 1);
        assert_eq!(config.embedding_dims, 768);
        assert_eq!(config.chain_strategy, ChainStrategy::Stuff);
    }

    #[test]
    fn validated_clamps_overlap_below_chunk_size() {
        let config = AppConfig {
            chunk_size: 100,
            chunk_overlap: 250,
            ..Default::default()
        }
        .validated();

        assert!(config.chunk_overlap < config.chunk_size);
    }

    #[test]
    fn validated_rejects_zero_top_k() {
        let config = AppConfig {
            top_k: 0,
            ..Default::default()
        }
        .validated();

        assert_eq!(config.top_k, 1);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load(&dir.path().join("nope.yml"));
        assert_eq!(config.chunk_size, 1000);
    }

    #[test]
    fn load_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "chunk_size: 400\ntop_k: 3\n").expect("write config");

        let config = AppConfig::load(&path);
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.embedding_model, "nomic-embed-text");
    }
}
