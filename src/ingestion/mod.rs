//! Document ingestion: URL → fetched markup → extracted text → embedding →
//! stored record.

pub mod extract;
pub mod fetch;

use std::sync::Arc;

use rig::embeddings::EmbeddingModel;
use tracing::info;
use url::Url;

use crate::models::embed_one;
use crate::stores::{DocumentRecord, VectorStore};
use crate::types::IngestError;

pub use extract::extract_text;
pub use fetch::{fetch_page, parse_url};

/// What a successful ingestion did, for display to the user.
#[derive(Clone, Debug)]
pub struct IngestReport {
    pub url: Url,
    pub fetched_bytes: usize,
    pub text_chars: usize,
}

/// Orchestrates fetch → extract → embed → store for one URL at a time.
///
/// Each stage short-circuits the pipeline on failure with its own
/// [`IngestError`] variant; the store is only touched once every earlier
/// stage has succeeded, so a failed ingestion never leaves a partial write.
/// Re-ingesting the same URL appends a fresh record — deduplication is out
/// of scope.
pub struct IngestionPipeline<E: EmbeddingModel> {
    embedder: E,
    store: Arc<dyn VectorStore>,
}

impl<E: EmbeddingModel> IngestionPipeline<E> {
    pub fn new(embedder: E, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    pub async fn ingest(&self, raw_url: &str) -> Result<IngestReport, IngestError> {
        let url = parse_url(raw_url).map_err(IngestError::Fetch)?;

        info!(%url, "fetching page");
        let html = fetch_page(&url).await.map_err(IngestError::Fetch)?;
        let fetched_bytes = html.len();

        let text = extract_text(&html)?;
        let text_chars = text.chars().count();

        let embedding = embed_one(&self.embedder, &text).await?;

        let record = DocumentRecord::new(&url, text);
        self.store.add(vec![(record, embedding)]).await?;
        self.store.persist().await?;

        info!(%url, fetched_bytes, text_chars, "ingested page");
        Ok(IngestReport {
            url,
            fetched_bytes,
            text_chars,
        })
    }
}
