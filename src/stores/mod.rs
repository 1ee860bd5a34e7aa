//! Vector storage for ingested documents.
//!
//! [`VectorStore`] is the seam between the pipelines and whatever database
//! actually holds the vectors; [`sqlite::SqliteDocumentStore`] is the one
//! shipped backend (sqlite + sqlite-vec). The trait is object safe so
//! pipelines can hold a `dyn VectorStore` and tests can swap backends
//! without touching pipeline code.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::types::StoreError;

pub use sqlite::SqliteDocumentStore;

/// One ingested page.
///
/// Created by the ingestion pipeline after successful extraction and
/// embedding, then owned by the store and never mutated. Invariants at
/// creation: `text` is non-empty and `source` is an absolute http(s) URL —
/// both are guaranteed upstream (the extractor rejects empty text, the
/// fetcher rejects non-absolute URLs).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub source: String,
    pub text: String,
}

impl DocumentRecord {
    pub fn new(source: &Url, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            text: text.into(),
        }
    }
}

/// Storage contract used by both pipelines.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts records with their embedding vectors.
    async fn add(&self, records: Vec<(DocumentRecord, Vec<f32>)>) -> Result<(), StoreError>;

    /// Nearest-neighbor search, most similar first, at most `top_k` results.
    ///
    /// The second tuple element is a similarity score where higher is more
    /// similar.
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(DocumentRecord, f32)>, StoreError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Flushes pending writes to durable storage.
    async fn persist(&self) -> Result<(), StoreError>;
}
