//! Turns a raw follow-up question plus prior turns into a grounded answer.
//!
//! Per question: validate, condense against history, retrieve, compose,
//! generate, record. Every failure path degrades to a user-facing answer
//! string; no error crosses this module's boundary, so one bad turn never
//! ends an interactive session.

use std::sync::Arc;

use serde::Serialize;

use crate::chat::history::ConversationHistory;
use crate::llm::{ChatRequest, LlmProvider};
use crate::rag::prompt::{self, ChainStrategy};
use crate::rag::{EmbeddingService, Retriever, ScoredChunk};

/// Returned for empty questions and for questions asked before a
/// document has been ingested.
pub const GUIDANCE_MESSAGE: &str = "Please ask a valid question.";

const NO_RESPONSE_MESSAGE: &str = "Sorry, an error occurred. No response was received.";
const NOTHING_RETRIEVED_MESSAGE: &str =
    "I couldn't find anything relevant to that in the loaded document.";

/// What happened to a question, alongside the always-present answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AskStatus {
    /// The model produced a grounded answer.
    Answered,
    /// The question was empty or no document is loaded; the answer is the
    /// fixed guidance message and nothing was recorded.
    Rejected,
    /// Retrieval returned no chunks.
    NothingRetrieved,
    /// The generation call failed or returned nothing.
    GenerationFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub status: AskStatus,
    pub sources: Vec<ScoredChunk>,
    pub condensed_question: Option<String>,
}

impl AskResponse {
    fn guidance() -> Self {
        Self {
            answer: GUIDANCE_MESSAGE.to_string(),
            status: AskStatus::Rejected,
            sources: Vec::new(),
            condensed_question: None,
        }
    }
}

/// Orchestrates condensation, retrieval, and generation for one session.
pub struct ChatEngine {
    provider: Arc<dyn LlmProvider>,
    embedder: EmbeddingService,
    chat_model: String,
    strategy: ChainStrategy,
}

impl ChatEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        embedder: EmbeddingService,
        chat_model: String,
        strategy: ChainStrategy,
    ) -> Self {
        Self {
            provider,
            embedder,
            chat_model,
            strategy,
        }
    }

    /// Answer `question` against the retriever, recording the turn.
    ///
    /// Rejected questions (empty, or `retriever` is `None`) return the
    /// guidance message without touching history. Past validation, a turn
    /// is appended no matter what happens, with a descriptive error string
    /// as the answer when a step fails.
    pub async fn answer(
        &self,
        retriever: Option<&Retriever>,
        history: &mut ConversationHistory,
        question: &str,
    ) -> AskResponse {
        let question = question.trim();
        let retriever = match retriever {
            Some(retriever) if !question.is_empty() => retriever,
            _ => return AskResponse::guidance(),
        };

        let pairs = history.completed_pairs();
        let (effective_question, condensed_question) = if pairs.is_empty() {
            (question.to_string(), None)
        } else {
            self.condense(&pairs, question).await
        };

        let query_embedding = self.embedder.embed(&effective_question).await;
        let sources = retriever.search(&query_embedding);

        if sources.is_empty() {
            history.record(question, NOTHING_RETRIEVED_MESSAGE);
            return AskResponse {
                answer: NOTHING_RETRIEVED_MESSAGE.to_string(),
                status: AskStatus::NothingRetrieved,
                sources,
                condensed_question,
            };
        }

        let messages = prompt::answer_messages(self.strategy, &sources, &effective_question);
        let (answer, status) = match self
            .provider
            .chat(ChatRequest::deterministic(messages), &self.chat_model)
            .await
        {
            Ok(content) => {
                let content = content.trim().to_string();
                if content.is_empty() {
                    (NO_RESPONSE_MESSAGE.to_string(), AskStatus::GenerationFailed)
                } else {
                    (content, AskStatus::Answered)
                }
            }
            Err(err) => {
                tracing::warn!("Answer generation failed: {}", err);
                (
                    format!("An error occurred: {}", err),
                    AskStatus::GenerationFailed,
                )
            }
        };

        history.record(question, &answer);

        AskResponse {
            answer,
            status,
            sources,
            condensed_question,
        }
    }

    /// Rewrite a follow-up into a standalone question using prior turns.
    ///
    /// Condensation failure must never block answering: on error or empty
    /// output the raw question is used unchanged.
    async fn condense(
        &self,
        pairs: &[(String, String)],
        follow_up: &str,
    ) -> (String, Option<String>) {
        let transcript = prompt::format_transcript(pairs);
        let messages = prompt::condense_messages(&transcript, follow_up);

        match self
            .provider
            .chat(ChatRequest::deterministic(messages), &self.chat_model)
            .await
        {
            Ok(standalone) => {
                let standalone = standalone.trim().to_string();
                if standalone.is_empty() {
                    (follow_up.to_string(), None)
                } else {
                    (standalone.clone(), Some(standalone))
                }
            }
            Err(err) => {
                tracing::warn!("Question condensation failed, using raw question: {}", err);
                (follow_up.to_string(), None)
            }
        }
    }
}
