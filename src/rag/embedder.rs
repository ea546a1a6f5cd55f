//! Embedding generation with a degrade-gracefully failure policy.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::llm::LlmProvider;

/// Wraps a provider and makes embedding a total function.
///
/// The fallback contract: when the provider call fails in any way
/// (network error, non-success status, malformed response, empty vector),
/// `embed` logs the failure and returns a zero-filled vector of the
/// configured dimension. A zero vector ranks below every real match in
/// cosine search, so one bad chunk degrades retrieval for that chunk
/// instead of aborting ingestion.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn LlmProvider>,
    model: String,
    dims: usize,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn LlmProvider>, model: String, dims: usize) -> Self {
        Self {
            provider,
            model,
            dims,
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Embed one text. Never fails; see the type-level fallback contract.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.provider.embed_one(text, &self.model).await {
            Ok(vector) if !vector.is_empty() => vector,
            Ok(_) => {
                tracing::warn!("Embedding provider returned an empty vector, substituting zeros");
                vec![0.0; self.dims]
            }
            Err(err) => {
                tracing::warn!("Embedding failed, substituting zero vector: {}", err);
                vec![0.0; self.dims]
            }
        }
    }

    /// Embed a batch, one request per text, issued concurrently.
    ///
    /// Each text's failure is isolated; the result always has one vector
    /// per input, in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        join_all(texts.iter().map(|text| self.embed(text))).await
    }
}
