//! Model service adapters.
//!
//! Embedding goes through rig's [`EmbeddingModel`] trait because the sqlite
//! store is generic over it; generation gets the crate's own [`Generator`]
//! trait since only a `prompt → text` contract is needed.

pub mod ollama;

use async_trait::async_trait;
use rig::embeddings::EmbeddingModel;

use crate::types::{EmbedError, GenerateError};

pub use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};

/// Text-generation contract: one prompt in, one answer out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Embeds a single text and converts the vector to `f32`.
///
/// rig models speak `f64` batches; the store and the search SQL work in
/// `f32`, so the narrowing happens exactly once, here.
pub async fn embed_one<E: EmbeddingModel>(model: &E, text: &str) -> Result<Vec<f32>, EmbedError> {
    let embeddings = model
        .embed_texts(vec![text.to_string()])
        .await
        .map_err(|err| EmbedError::Model(err.to_string()))?;
    let first = embeddings
        .into_iter()
        .next()
        .ok_or_else(|| EmbedError::Model("model returned no embedding".to_string()))?;
    Ok(first.vec.into_iter().map(|value| value as f32).collect())
}
