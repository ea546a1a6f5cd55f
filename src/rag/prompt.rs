//! Prompt assembly for condensation and grounded answering.

use serde::{Deserialize, Serialize};

use super::index::ScoredChunk;
use crate::llm::ChatMessage;

/// How retrieved chunks are combined with the question.
///
/// `Stuff` concatenates every retrieved chunk into a single prompt, which
/// stays within context limits while `top_k` is small. Incremental
/// strategies (map-reduce, refine) would be further variants behind the
/// same seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStrategy {
    #[default]
    Stuff,
}

/// Render completed (question, answer) pairs as a readable transcript.
pub fn format_transcript(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (question, answer) in pairs {
        out.push_str("Human: ");
        out.push_str(question);
        out.push('\n');
        out.push_str("Assistant: ");
        out.push_str(answer);
        out.push('\n');
    }
    out
}

/// Messages asking the model to rewrite a follow-up into a standalone question.
pub fn condense_messages(transcript: &str, follow_up: &str) -> Vec<ChatMessage> {
    let instruction = "Rewrite the follow-up question as a single standalone question \
        that can be understood without the conversation. Resolve pronouns and \
        references using the conversation. Reply with the standalone question only.";
    let prompt = format!(
        "Conversation so far:\n{transcript}\nFollow-up question: {follow_up}\nStandalone question:"
    );

    vec![ChatMessage::system(instruction), ChatMessage::user(prompt)]
}

/// Messages asking the model to answer from the retrieved context only.
pub fn answer_messages(
    strategy: ChainStrategy,
    context: &[ScoredChunk],
    question: &str,
) -> Vec<ChatMessage> {
    match strategy {
        ChainStrategy::Stuff => stuff_messages(context, question),
    }
}

fn stuff_messages(context: &[ScoredChunk], question: &str) -> Vec<ChatMessage> {
    let instruction = "You answer questions about a document. Use only the provided \
        context. If the context does not contain the answer, say that you don't know \
        instead of guessing.";
    let prompt = format!(
        "Context:\n{}\n\nQuestion: {}",
        format_context(context),
        question
    );

    vec![ChatMessage::system(instruction), ChatMessage::user(prompt)]
}

/// Number each chunk and tag it with its source and relevance.
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    let mut context = String::new();
    for (i, scored) in chunks.iter().enumerate() {
        context.push_str(&format!(
            "[{}] (Source: {}, relevance: {:.2})\n{}\n\n",
            i + 1,
            scored.chunk.source,
            scored.score,
            scored.chunk.text
        ));
    }
    context.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::chunker::{split, ChunkerConfig};

    fn scored(text: &str, score: f32) -> ScoredChunk {
        let chunk = split(text, "report.pdf", &ChunkerConfig::default())
            .into_iter()
            .next()
            .expect("chunk");
        ScoredChunk { chunk, score }
    }

    #[test]
    fn default_strategy_is_stuff() {
        assert_eq!(ChainStrategy::default(), ChainStrategy::Stuff);
    }

    #[test]
    fn transcript_interleaves_roles() {
        let pairs = vec![("What is it?".to_string(), "A report.".to_string())];
        let transcript = format_transcript(&pairs);
        assert_eq!(transcript, "Human: What is it?\nAssistant: A report.\n");
    }

    #[test]
    fn context_numbers_chunks_and_names_sources() {
        let context = format_context(&[scored("First passage.", 0.91), scored("Second.", 0.40)]);
        assert!(context.starts_with("[1] (Source: report.pdf"));
        assert!(context.contains("[2]"));
        assert!(context.contains("First passage."));
    }

    #[test]
    fn stuff_messages_carry_context_and_question() {
        let messages = answer_messages(
            ChainStrategy::Stuff,
            &[scored("Gamma rays are discussed.", 0.8)],
            "What is discussed?",
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("Gamma rays are discussed."));
        assert!(messages[1].content.contains("Question: What is discussed?"));
    }

    #[test]
    fn condense_messages_embed_history_and_follow_up() {
        let messages = condense_messages("Human: Hi\nAssistant: Hello\n", "what about it?");
        assert!(messages[1].content.contains("Human: Hi"));
        assert!(messages[1].content.contains("Follow-up question: what about it?"));
    }
}
