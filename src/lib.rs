//! ```text
//! URL ──► ingestion::fetch ──► ingestion::extract ──► models (embed) ──► stores::sqlite
//!
//! Question ──► models (embed) ──► stores (top-k search) ──► chat::AnswerPipeline
//!                                                                  │
//!                              models (generate) ◄── prompt ◄──────┘
//!                                      │
//!                                      └──► answer ──► chat::ConversationLog
//! ```
//!
pub mod chat;
pub mod config;
pub mod ingestion;
pub mod models;
pub mod stores;
pub mod types;

pub use chat::{AnswerPipeline, ChatSession, ConversationEntry, ConversationLog, DEFAULT_TOP_K};
pub use config::AppConfig;
pub use ingestion::{IngestReport, IngestionPipeline};
pub use models::{Generator, OllamaEmbedder, OllamaGenerator};
pub use stores::{DocumentRecord, VectorStore, sqlite::SqliteDocumentStore};
