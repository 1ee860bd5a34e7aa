//! Question answering: retrieval, prompt composition, generation, and the
//! session that ties them to a conversation log.

pub mod log;

use std::sync::Arc;

use rig::embeddings::EmbeddingModel;
use tracing::{info, warn};

use crate::models::{Generator, embed_one};
use crate::stores::VectorStore;
use crate::types::AnswerError;

pub use log::{ConversationEntry, ConversationLog};

/// How many records are retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Builds the fixed generation prompt from retrieved context and a question.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{context}\n\nQuestion: {question}\nAnswer:")
}

/// Retrieval-and-answer pipeline: embed the question, pull the top-k most
/// similar records, compose the prompt, generate.
pub struct AnswerPipeline<E: EmbeddingModel> {
    embedder: E,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl<E: EmbeddingModel> AnswerPipeline<E> {
    pub fn new(embedder: E, store: Arc<dyn VectorStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            embedder,
            store,
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Answers `question` from the indexed corpus.
    ///
    /// An empty corpus is not an error: the prompt is built with empty
    /// context and still goes to the generation service, which answers from
    /// its own knowledge (or says it cannot).
    pub async fn answer(&self, question: &str) -> Result<String, AnswerError> {
        let query_embedding = embed_one(&self.embedder, question).await?;
        let hits = self.store.search(&query_embedding, self.top_k).await?;
        info!(hits = hits.len(), "retrieved context records");

        let context = hits
            .iter()
            .map(|(record, _)| record.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = build_prompt(&context, question);
        Ok(self.generator.generate(&prompt).await?)
    }
}

/// One user session: answer pipeline plus its conversation log.
///
/// The log is an explicit value owned here, independent of any presentation
/// layer. `ask` never fails: pipeline errors become a formatted answer
/// string so the session can always display something, and every call
/// appends exactly one (question, answer) pair.
pub struct ChatSession<E: EmbeddingModel> {
    pipeline: AnswerPipeline<E>,
    log: ConversationLog,
}

impl<E: EmbeddingModel> ChatSession<E> {
    pub fn new(pipeline: AnswerPipeline<E>) -> Self {
        Self {
            pipeline,
            log: ConversationLog::new(),
        }
    }

    pub async fn ask(&mut self, question: &str) -> String {
        let answer = match self.pipeline.answer(question).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "answer pipeline failed");
                format!("[Error: {err}]")
            }
        };
        self.log.append(question, answer.clone());
        answer
    }

    pub fn history_newest_first(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.log.newest_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_follows_fixed_template() {
        let prompt = build_prompt("Paris is the capital of France.", "What is the capital?");
        assert_eq!(
            prompt,
            "Context:\nParis is the capital of France.\n\nQuestion: What is the capital?\nAnswer:"
        );
    }

    #[test]
    fn prompt_with_empty_context_keeps_shape() {
        let prompt = build_prompt("", "Anything?");
        assert_eq!(prompt, "Context:\n\n\nQuestion: Anything?\nAnswer:");
    }
}
