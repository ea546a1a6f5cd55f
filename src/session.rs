//! Session state: one document's index plus the conversation over it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::chat::{AskResponse, ChatEngine, ConversationHistory, Turn};
use crate::core::config::AppConfig;
use crate::document::{Document, IngestError};
use crate::llm::LlmProvider;
use crate::rag::{chunker, ChunkerConfig, EmbeddingService, Retriever, VectorIndex};

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub document_id: String,
    pub source: String,
    pub chunks: usize,
    pub pages: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub document: Option<String>,
    pub chunks: usize,
    pub turns: usize,
}

#[derive(Debug, Clone)]
struct LoadedDocument {
    id: String,
    source: String,
}

#[derive(Default)]
struct SessionInner {
    retriever: Option<Retriever>,
    history: ConversationHistory,
    document: Option<LoadedDocument>,
}

/// Owns at most one vector index and one conversation history.
///
/// `ingest` and `ask` are the only mutators. The mutable core sits behind
/// a single async mutex, so ingestion is atomic with respect to asking:
/// a question sees either the old index+history or the new, never a mix.
/// Hosts wanting several independent conversations construct several
/// sessions; nothing is shared between them.
pub struct DocumentSession {
    inner: Mutex<SessionInner>,
    chunker: ChunkerConfig,
    embedder: EmbeddingService,
    engine: ChatEngine,
    top_k: usize,
}

impl DocumentSession {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AppConfig) -> Self {
        let embedder = EmbeddingService::new(
            provider.clone(),
            config.embedding_model.clone(),
            config.embedding_dims,
        );
        let engine = ChatEngine::new(
            provider,
            embedder.clone(),
            config.chat_model.clone(),
            config.chain_strategy,
        );

        Self {
            inner: Mutex::new(SessionInner::default()),
            chunker: ChunkerConfig {
                chunk_size: config.chunk_size,
                chunk_overlap: config.chunk_overlap,
            },
            embedder,
            engine,
            top_k: config.top_k,
        }
    }

    /// Replace the loaded document: chunk, embed, build the index, then
    /// atomically install it and clear history.
    ///
    /// Validation and index building happen before anything is replaced,
    /// so a failed ingestion leaves the previous document answerable.
    pub async fn ingest(&self, document: Document) -> Result<IngestReport, IngestError> {
        if document.text.trim().is_empty() {
            return Err(IngestError::NoText(document.source));
        }

        let chunks = chunker::split(&document.text, &document.source, &self.chunker);
        if chunks.is_empty() {
            return Err(IngestError::NoChunks(document.source));
        }
        let chunk_count = chunks.len();

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await;

        let index = VectorIndex::build(chunks, embeddings);
        let retriever = Retriever::new(index, self.top_k);

        let mut inner = self.inner.lock().await;
        inner.retriever = Some(retriever);
        inner.history.clear();
        inner.document = Some(LoadedDocument {
            id: document.id.clone(),
            source: document.source.clone(),
        });

        tracing::info!("Ingested {} ({} chunks)", document.source, chunk_count);

        Ok(IngestReport {
            document_id: document.id,
            source: document.source,
            chunks: chunk_count,
            pages: document.pages,
        })
    }

    /// Answer a question against the loaded document. Total: questions
    /// asked before ingestion get the fixed guidance message.
    pub async fn ask(&self, question: &str) -> AskResponse {
        let mut inner = self.inner.lock().await;
        let SessionInner {
            retriever, history, ..
        } = &mut *inner;

        self.engine
            .answer(retriever.as_ref(), history, question)
            .await
    }

    pub async fn status(&self) -> SessionStatus {
        let inner = self.inner.lock().await;
        SessionStatus {
            document: inner.document.as_ref().map(|doc| doc.source.clone()),
            chunks: inner
                .retriever
                .as_ref()
                .map(Retriever::chunk_count)
                .unwrap_or(0),
            turns: inner.history.len(),
        }
    }

    /// Snapshot of the recorded turns, oldest first.
    pub async fn transcript(&self) -> Vec<Turn> {
        let inner = self.inner.lock().await;
        inner.history.turns().to_vec()
    }

    pub async fn document_id(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        inner.document.as_ref().map(|doc| doc.id.clone())
    }
}
