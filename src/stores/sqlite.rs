//! SQLite vector store backend.
//!
//! Documents live in a `documents` table managed by rig-sqlite; embeddings
//! live in the companion `documents_embeddings` vec0 virtual table provided
//! by the sqlite-vec extension. Similarity search runs directly over
//! `vec_distance_cosine` so a precomputed query embedding can be used
//! without re-embedding through the model.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;

use rig::OneOrMany;
use rig::embeddings::{Embedding, EmbeddingModel};
use rig_sqlite::{Column, ColumnValue, SqliteVectorStore, SqliteVectorStoreTable};
use tokio_rusqlite::{Connection, ffi};

use super::{DocumentRecord, VectorStore};
use crate::types::StoreError;

impl SqliteVectorStoreTable for DocumentRecord {
    fn name() -> &'static str {
        "documents"
    }

    fn schema() -> Vec<Column> {
        vec![
            Column::new("id", "TEXT PRIMARY KEY"),
            Column::new("source", "TEXT").indexed(),
            Column::new("text", "TEXT"),
        ]
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn column_values(&self) -> Vec<(&'static str, Box<dyn ColumnValue>)> {
        vec![
            ("id", Box::new(self.id.clone())),
            ("source", Box::new(self.source.clone())),
            ("text", Box::new(self.text.clone())),
        ]
    }
}

/// Durable document store backed by a sqlite file.
#[derive(Clone)]
pub struct SqliteDocumentStore<E>
where
    E: EmbeddingModel + 'static,
{
    inner: SqliteVectorStore<E, DocumentRecord>,
    /// Separate handle for direct SQL not covered by rig-sqlite; clone of
    /// the connection the inner store uses.
    conn: Connection,
}

impl<E> SqliteDocumentStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database at `path`.
    ///
    /// Registers the sqlite-vec extension process-wide on first use and
    /// verifies it loaded by probing `vec_version()`.
    pub async fn open(path: impl AsRef<Path>, model: &E) -> Result<Self, StoreError> {
        Self::register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        conn.call(|conn| {
            match conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0)) {
                Ok(_) => Ok(()),
                Err(err) => Err(tokio_rusqlite::Error::Rusqlite(err)),
            }
        })
        .await
        .map_err(|err| StoreError::Storage(err.to_string()))?;
        // Clone for direct access before the connection moves into the store.
        let conn_for_queries = conn.clone();
        let store = SqliteVectorStore::new(conn, model)
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        Ok(Self {
            inner: store,
            conn: conn_for_queries,
        })
    }

    fn register_sqlite_vec() -> Result<(), StoreError> {
        use std::sync::Mutex;

        static INIT: Once = Once::new();
        static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

        INIT.call_once(|| {
            let result = unsafe {
                type SqliteExtensionInit = unsafe extern "C" fn(
                    *mut ffi::sqlite3,
                    *mut *mut c_char,
                    *const ffi::sqlite3_api_routines,
                ) -> i32;

                let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
                let init_fn: SqliteExtensionInit =
                    transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
                let rc = ffi::sqlite3_auto_extension(Some(init_fn));
                if rc != 0 {
                    Err(format!(
                        "failed to register sqlite-vec extension (code {rc})"
                    ))
                } else {
                    Ok(())
                }
            };
            *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
        });

        INIT_RESULT
            .lock()
            .expect("init result mutex poisoned")
            .clone()
            .expect("init was called but result not set")
            .map_err(StoreError::Storage)
    }
}

#[async_trait::async_trait]
impl<E> VectorStore for SqliteDocumentStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    async fn add(&self, records: Vec<(DocumentRecord, Vec<f32>)>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut rows = Vec::with_capacity(records.len());
        for (record, embedding) in records {
            let vec: Vec<f64> = embedding.into_iter().map(|value| value as f64).collect();
            let embed = Embedding {
                document: record.text.clone(),
                vec,
            };
            rows.push((record, OneOrMany::one(embed)));
        }
        self.inner
            .add_rows(rows)
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(DocumentRecord, f32)>, StoreError> {
        let embedding_json = serde_json::to_string(query_embedding)
            .map_err(|err| StoreError::Storage(err.to_string()))?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT d.id, d.source, d.text, \
                         vec_distance_cosine(e.embedding, vec_f32(?)) as distance \
                         FROM documents d \
                         JOIN documents_embeddings e ON d.rowid = e.rowid \
                         ORDER BY distance ASC \
                         LIMIT {}",
                        top_k
                    ))
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let rows = stmt
                    .query_map([&embedding_json], |row| {
                        let record = DocumentRecord {
                            id: row.get(0)?,
                            source: row.get(1)?,
                            text: row.get(2)?,
                        };
                        let distance: f32 = row.get(3)?;
                        // Cosine distance in [0, 2]; report 1 - distance so
                        // higher means more similar.
                        Ok((record, 1.0 - distance))
                    })
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row.map_err(tokio_rusqlite::Error::Rusqlite)?);
                }
                Ok(results)
            })
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.conn
            .call(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))
    }

    async fn persist(&self) -> Result<(), StoreError> {
        // Inserts commit on write; the checkpoint folds the WAL into the
        // main db file so the on-disk database is current when this returns.
        self.conn
            .call(|conn| {
                conn.query_row("PRAGMA wal_checkpoint(FULL)", [], |_row| Ok(()))
                    .map_err(tokio_rusqlite::Error::Rusqlite)
            })
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))
    }
}
