//! Append-only conversation history.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One question/answer exchange. The answer is absent while a turn is in
/// flight; failed turns record a descriptive error string instead of
/// omitting the turn, so the transcript stays complete.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub question: String,
    pub answer: Option<String>,
    pub asked_at: DateTime<Utc>,
}

impl Turn {
    pub fn answered(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: Some(answer.into()),
            asked_at: Utc::now(),
        }
    }
}

/// Ordered sequence of turns. Mutation is restricted to append and
/// full clear; both happen inside the session's critical section.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: &str, answer: &str) {
        self.turns.push(Turn::answered(question, answer));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// (question, answer) pairs for turns that have completed.
    pub fn completed_pairs(&self) -> Vec<(String, String)> {
        self.turns
            .iter()
            .filter_map(|turn| {
                turn.answer
                    .as_ref()
                    .map(|answer| (turn.question.clone(), answer.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_order() {
        let mut history = ConversationHistory::new();
        history.record("q1", "a1");
        history.record("q2", "a2");

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].question, "q1");
        assert_eq!(history.turns()[1].question, "q2");
    }

    #[test]
    fn clear_removes_everything() {
        let mut history = ConversationHistory::new();
        history.record("q", "a");
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn completed_pairs_skip_inflight_turns() {
        let mut history = ConversationHistory::new();
        history.record("q1", "a1");
        history.turns.push(Turn {
            question: "q2".to_string(),
            answer: None,
            asked_at: Utc::now(),
        });

        let pairs = history.completed_pairs();
        assert_eq!(pairs, vec![("q1".to_string(), "a1".to_string())]);
    }
}
