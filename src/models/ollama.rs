//! Ollama HTTP adapters for embedding and generation.
//!
//! Both adapters speak Ollama's native API (`/api/embeddings` and
//! `/api/generate`, non-streaming). Model name and endpoint come from
//! [`crate::config::AppConfig`]; nothing is hardcoded per call.

use std::future::Future;

use async_trait::async_trait;
use reqwest::Client;
use rig::embeddings::embedding::{Embedding, EmbeddingError, EmbeddingModel};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::Generator;
use crate::config::DEFAULT_EMBED_DIM;
use crate::types::GenerateError;

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f64>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Connection handle for an Ollama server: one HTTP client plus the base
/// URL, shared by the adapters built from it.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    host: Url,
}

impl OllamaClient {
    pub fn new(host: Url) -> Self {
        Self {
            http: Client::new(),
            host,
        }
    }
}

/// Embedding model backed by an Ollama server.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    host: Url,
    model: String,
    ndims: usize,
}

impl OllamaEmbedder {
    pub fn new(host: Url, model: impl Into<String>, ndims: usize) -> Self {
        Self {
            client: Client::new(),
            host,
            model: model.into(),
            ndims,
        }
    }

    async fn embed_text(&self, text: String) -> Result<Embedding, EmbeddingError> {
        let endpoint = self
            .host
            .join("api/embeddings")
            .map_err(|err| EmbeddingError::ProviderError(err.to_string()))?;
        let response = self
            .client
            .post(endpoint)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|err| EmbeddingError::ProviderError(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ProviderError(format!(
                "ollama returned {status}: {body}"
            )));
        }
        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|err| EmbeddingError::ProviderError(err.to_string()))?;
        if parsed.embedding.len() != self.ndims {
            return Err(EmbeddingError::ProviderError(format!(
                "model '{}' returned a {}-dimensional embedding, expected {} \
                 (set ZEROBOT_EMBED_DIM to match the model)",
                self.model,
                parsed.embedding.len(),
                self.ndims
            )));
        }
        debug!(model = %self.model, chars = text.len(), "embedded text");
        Ok(Embedding {
            document: text,
            vec: parsed.embedding,
        })
    }
}

impl EmbeddingModel for OllamaEmbedder {
    const MAX_DOCUMENTS: usize = 32;

    type Client = OllamaClient;

    fn make(client: &Self::Client, model: impl Into<String>, dims: Option<usize>) -> Self {
        Self {
            client: client.http.clone(),
            host: client.host.clone(),
            model: model.into(),
            ndims: dims.unwrap_or(DEFAULT_EMBED_DIM),
        }
    }

    fn ndims(&self) -> usize {
        self.ndims
    }

    fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> impl Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send {
        let texts: Vec<String> = texts.into_iter().collect();
        async move {
            // The embeddings endpoint takes one prompt at a time.
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed_text(text).await?);
            }
            Ok(out)
        }
    }
}

/// Completion model backed by an Ollama server.
#[derive(Clone)]
pub struct OllamaGenerator {
    client: Client,
    host: Url,
    model: String,
}

impl OllamaGenerator {
    pub fn new(host: Url, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let endpoint = self
            .host
            .join("api/generate")
            .map_err(|err| GenerateError::Model(err.to_string()))?;
        let response = self
            .client
            .post(endpoint)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Model(format!(
                "ollama returned {status}: {body}"
            )));
        }
        let parsed: GenerateResponse = response.json().await?;
        debug!(model = %self.model, chars = parsed.response.len(), "generated answer");
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new(Url::parse("http://localhost:11434").unwrap())
    }

    #[test]
    fn make_builds_an_embedder_from_the_client() {
        let embedder = <OllamaEmbedder as EmbeddingModel>::make(&client(), "gemma:2b", Some(8));
        assert_eq!(embedder.ndims(), 8);
        assert_eq!(embedder.model, "gemma:2b");
    }

    #[test]
    fn make_defaults_the_dimension_when_unspecified() {
        let embedder = <OllamaEmbedder as EmbeddingModel>::make(&client(), "gemma:2b", None);
        assert_eq!(embedder.ndims(), DEFAULT_EMBED_DIM);
    }
}
