//! End-to-end pipeline tests with mock services.
//!
//! The embedding model is a deterministic hash-based stand-in, the
//! generation service echoes its prompt (so assertions can see exactly what
//! context reached it), and pages are served by httpmock. No Ollama or
//! network access required.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use httpmock::prelude::*;
use rig::embeddings::embedding::{Embedding, EmbeddingError, EmbeddingModel};
use tempfile::TempDir;

use zerobot::chat::{AnswerPipeline, ChatSession};
use zerobot::ingestion::IngestionPipeline;
use zerobot::models::{Generator, embed_one};
use zerobot::stores::sqlite::SqliteDocumentStore;
use zerobot::stores::VectorStore;
use zerobot::types::{GenerateError, IngestError};

#[derive(Clone)]
struct HashEmbedder;

impl EmbeddingModel for HashEmbedder {
    const MAX_DOCUMENTS: usize = 64;

    type Client = ();

    fn make(_client: &Self::Client, _model: impl Into<String>, _dims: Option<usize>) -> Self {
        Self
    }

    fn ndims(&self) -> usize {
        8
    }

    fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> impl std::future::Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send {
        let docs: Vec<String> = texts.into_iter().collect();
        async move {
            Ok(docs
                .into_iter()
                .map(|document| Embedding {
                    vec: hash_to_vec(&document),
                    document,
                })
                .collect())
        }
    }
}

fn hash_to_vec(text: &str) -> Vec<f64> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..8)
        .map(|i| {
            let bits = seed.rotate_left((i * 8) as u32) ^ ((i as u64) << 24);
            (bits as f64) / u32::MAX as f64
        })
        .collect()
}

/// Returns its prompt verbatim, so tests can assert on the exact context
/// the generation service received.
struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        Ok(prompt.to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Model("model server unreachable".to_string()))
    }
}

async fn open_store(dir: &TempDir) -> Arc<dyn VectorStore> {
    let db_path: PathBuf = dir.path().join("test.sqlite3");
    let store = SqliteDocumentStore::open(&db_path, &HashEmbedder)
        .await
        .expect("store should open");
    Arc::new(store)
}

#[tokio::test]
async fn ingest_stores_record_with_source_and_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/doc");
            then.status(200)
                .body("<html><body><p>Rust has fearless concurrency.</p></body></html>");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let pipeline = IngestionPipeline::new(HashEmbedder, Arc::clone(&store));

    let url = server.url("/doc");
    let report = pipeline.ingest(&url).await.expect("ingest should succeed");
    assert_eq!(report.url.as_str(), url);
    assert!(report.text_chars > 0);
    assert_eq!(store.count().await.unwrap(), 1);

    let query = embed_one(&HashEmbedder, "Rust has fearless concurrency.")
        .await
        .unwrap();
    let hits = store.search(&query, 3).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.source, url);
    assert_eq!(hits[0].0.text, "Rust has fearless concurrency.");
}

#[tokio::test]
async fn fetch_failure_leaves_store_unmodified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        })
        .await;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let pipeline = IngestionPipeline::new(HashEmbedder, Arc::clone(&store));

    let err = pipeline.ingest(&server.url("/broken")).await.unwrap_err();
    assert!(matches!(err, IngestError::Fetch(_)), "got {err:?}");
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn blank_page_fails_extraction_without_writes() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/blank");
            then.status(200).body("<html><body>   </body></html>");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let pipeline = IngestionPipeline::new(HashEmbedder, Arc::clone(&store));

    let err = pipeline.ingest(&server.url("/blank")).await.unwrap_err();
    assert!(matches!(err, IngestError::Extract(_)), "got {err:?}");
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_url_is_a_fetch_error() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let pipeline = IngestionPipeline::new(HashEmbedder, store);

    for bad in ["", "   ", "not a url", "ftp://example.com/x"] {
        let err = pipeline.ingest(bad).await.unwrap_err();
        assert!(matches!(err, IngestError::Fetch(_)), "input {bad:?} gave {err:?}");
    }
}

#[tokio::test]
async fn search_on_empty_store_returns_no_hits() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let query = embed_one(&HashEmbedder, "anything").await.unwrap();
    let hits = store
        .search(&query, 3)
        .await
        .expect("search must not fail on an empty store");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn ask_on_empty_store_answers_without_error() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let mut session = ChatSession::new(AnswerPipeline::new(
        HashEmbedder,
        store,
        Arc::new(EchoGenerator),
    ));

    let answer = session.ask("anything at all?").await;
    assert!(
        !answer.starts_with("[Error:"),
        "empty corpus must not surface as a failure, got: {answer}"
    );
}

#[tokio::test]
async fn answer_on_empty_store_still_reaches_generation() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let pipeline = AnswerPipeline::new(HashEmbedder, store, Arc::new(EchoGenerator));

    let answer = pipeline
        .answer("anything at all?")
        .await
        .expect("empty corpus must not be an error");
    // Echoed prompt shows the template was built with empty context.
    assert!(answer.starts_with("Context:\n\n\nQuestion: anything at all?"));
}

#[tokio::test]
async fn ingested_context_reaches_the_generator() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/france");
            then.status(200)
                .body("<html><body><p>Paris is the capital of France.</p></body></html>");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let ingestor = IngestionPipeline::new(HashEmbedder, Arc::clone(&store));
    ingestor.ingest(&server.url("/france")).await.unwrap();

    let pipeline = AnswerPipeline::new(HashEmbedder, store, Arc::new(EchoGenerator));
    let answer = pipeline
        .answer("What is the capital of France?")
        .await
        .unwrap();
    assert!(
        answer.contains("Paris"),
        "retrieved context should contain the ingested fact, got: {answer}"
    );
}

#[tokio::test]
async fn session_history_is_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let mut session = ChatSession::new(AnswerPipeline::new(
        HashEmbedder,
        store,
        Arc::new(EchoGenerator),
    ));

    session.ask("a").await;
    session.ask("b").await;

    let questions: Vec<String> = session
        .history_newest_first()
        .map(|entry| entry.question.clone())
        .collect();
    assert_eq!(questions, vec!["b".to_string(), "a".to_string()]);
}

#[tokio::test]
async fn session_formats_failures_and_logs_exactly_once() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let mut session = ChatSession::new(AnswerPipeline::new(
        HashEmbedder,
        store,
        Arc::new(FailingGenerator),
    ));

    let answer = session.ask("will this work?").await;
    assert!(answer.starts_with("[Error:"), "got: {answer}");
    assert!(answer.contains("generation failed"));

    let entries: Vec<_> = session.history_newest_first().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].question, "will this work?");
    assert_eq!(entries[0].answer, answer);
}

#[tokio::test]
async fn reingesting_appends_a_new_record() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/same");
            then.status(200)
                .body("<html><body><p>Same page, same content.</p></body></html>");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let pipeline = IngestionPipeline::new(HashEmbedder, Arc::clone(&store));

    let url = server.url("/same");
    pipeline.ingest(&url).await.unwrap();
    pipeline.ingest(&url).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
}
