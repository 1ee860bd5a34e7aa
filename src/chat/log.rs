//! Session conversation history.

/// One question/answer exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
}

/// Append-only, in-memory record of the session's exchanges.
///
/// Insertion order is arrival order; display iterates newest first. There
/// is deliberately no edit or delete operation, and nothing persists across
/// restarts.
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.push(ConversationEntry {
            question: question.into(),
            answer: answer.into(),
        });
    }

    /// Entries in reverse arrival order (latest exchange first).
    pub fn newest_first(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_reverses_arrival_order() {
        let mut log = ConversationLog::new();
        log.append("a", "answer a");
        log.append("b", "answer b");

        let questions: Vec<&str> = log.newest_first().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["b", "a"]);
    }

    #[test]
    fn append_preserves_pairing() {
        let mut log = ConversationLog::new();
        log.append("q", "a");
        let entry = log.newest_first().next().unwrap();
        assert_eq!(entry.question, "q");
        assert_eq!(entry.answer, "a");
        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
    }
}
