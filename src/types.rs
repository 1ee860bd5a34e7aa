//! Error taxonomy for the ingestion and answer pipelines.
//!
//! Each external boundary (network, markup parsing, model service, storage)
//! gets its own error type, and the two pipelines compose them into
//! stage-tagged variants so callers can tell the user exactly which step to
//! retry (re-crawl vs re-ask).

use thiserror::Error;

/// Failures while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("url must be non-empty")]
    EmptyUrl,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures while turning raw markup into indexable text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The markup parsed but contained no visible text. Ingesting an empty
    /// document is never useful, so this is a hard failure rather than an
    /// empty success.
    #[error("document contained no extractable text")]
    EmptyContent,

    #[error("failed to parse markup: {0}")]
    Parse(String),
}

/// Failures from the embedding model service.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding model error: {0}")]
    Model(String),
}

/// Failures from the generation model service.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to generation service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation model error: {0}")]
    Model(String),
}

/// Failures from the vector store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage-tagged failure of [`crate::IngestionPipeline::ingest`].
///
/// The pipeline short-circuits on the first failing stage; the variant
/// records which one it was.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to extract text: {0}")]
    Extract(#[from] ExtractError),

    #[error("failed to embed document: {0}")]
    Embed(#[from] EmbedError),

    #[error("failed to store document: {0}")]
    Store(#[from] StoreError),
}

/// Stage-tagged failure of [`crate::AnswerPipeline::answer`].
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("failed to embed question: {0}")]
    Embed(#[from] EmbedError),

    #[error("retrieval failed: {0}")]
    Retrieve(#[from] StoreError),

    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),
}

/// Failures while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}
