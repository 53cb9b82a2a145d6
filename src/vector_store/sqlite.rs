//! SQLite-based vector store implementation.
//!
//! Similarity is computed in Rust over every row of the collection.
//! Embeddings are stored as little-endian f32 BLOBs and metadata as JSON.

use super::{rank, EntryMetadata, IndexEntry, SearchHit, VectorStore};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    video_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    document TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT NOT NULL,
    indexed_at TEXT NOT NULL,
    UNIQUE (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_entries_video ON entries(collection, video_id);
"#;

const INSERT: &str = r#"
INSERT OR REPLACE INTO entries
(collection, id, video_id, chunk_index, document, embedding, metadata, indexed_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

/// SQLite-based vector store holding one named collection.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all, fields(collection = collection))]
    pub fn new(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VidqaError::IndexBackend(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn insert(&self, conn: &Connection, entry: &IndexEntry) -> Result<()> {
        let metadata = serde_json::to_string(&entry.metadata)?;
        conn.execute(
            INSERT,
            params![
                self.collection,
                entry.id,
                entry.metadata.video_id,
                entry.metadata.chunk_index as i64,
                entry.document,
                Self::embedding_to_bytes(&entry.embedding),
                metadata,
                entry.indexed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn metadata_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<EntryMetadata> {
    let json: String = row.get(idx)?;
    serde_json::from_str(&json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Columns: id, document, embedding, metadata, indexed_at.
fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<IndexEntry> {
    let embedding: Vec<u8> = row.get(2)?;
    Ok(IndexEntry {
        id: row.get(0)?,
        document: row.get(1)?,
        embedding: SqliteVectorStore::bytes_to_embedding(&embedding),
        metadata: metadata_column(row, 3)?,
        indexed_at: timestamp_column(row, 4)?,
    })
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn replace_video(&self, video_id: &str, entries: &[IndexEntry]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let removed = tx.execute(
            "DELETE FROM entries WHERE collection = ?1 AND video_id = ?2",
            params![self.collection, video_id],
        )?;
        for entry in entries {
            self.insert(&tx, entry)?;
        }

        tx.commit()?;
        info!(
            "Replaced {} entries with {} for video {}",
            removed,
            entries.len(),
            video_id
        );
        Ok(removed)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn put_batch(&self, entries: &[IndexEntry]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for entry in entries {
            self.insert(&tx, entry)?;
        }

        tx.commit()?;
        debug!("Batch stored {} entries", entries.len());
        Ok(entries.len())
    }

    #[instrument(skip(self, embedding))]
    async fn query_by_vector(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT document, embedding, metadata FROM entries WHERE collection = ?1 ORDER BY seq",
        )?;

        let hits = stmt
            .query_map(params![self.collection], |row| {
                let bytes: Vec<u8> = row.get(1)?;
                Ok(SearchHit::new(
                    row.get(0)?,
                    metadata_column(row, 2)?,
                    embedding,
                    &Self::bytes_to_embedding(&bytes),
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let hits = rank(hits, limit);
        debug!("Found {} matching entries", hits.len());
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn delete_where_video(&self, video_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM entries WHERE collection = ?1 AND video_id = ?2",
            params![self.collection, video_id],
        )?;

        info!("Deleted {} entries for video {}", deleted, video_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn entries_for_video(&self, video_id: &str) -> Result<Vec<IndexEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document, embedding, metadata, indexed_at
            FROM entries
            WHERE collection = ?1 AND video_id = ?2
            ORDER BY chunk_index
            "#,
        )?;

        let entries = stmt
            .query_map(params![self.collection, video_id], entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Found {} entries for video {}", entries.len(), video_id);
        Ok(entries)
    }

    async fn all_metadata(&self) -> Result<Vec<(EntryMetadata, DateTime<Utc>)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT metadata, indexed_at FROM entries WHERE collection = ?1 ORDER BY seq",
        )?;

        let rows = stmt
            .query_map(params![self.collection], |row| {
                Ok((metadata_column(row, 0)?, timestamp_column(row, 1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn reset(&self) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM entries WHERE collection = ?1",
            params![self.collection],
        )?;
        info!("Cleared collection {} ({} entries)", self.collection, deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::entry;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory("test").unwrap();

        store
            .put_batch(&[entry("video1", 0, vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        let rows = store.all_metadata().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.video_id, "video1");

        let results = store.query_by_vector(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].similarity - 1.0).abs() < 0.001);
        assert!(results[0].distance.abs() < 0.001);

        let deleted = store.delete_where_video("video1").await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.delete_where_video("video1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_replace_video_swaps_all_entries() {
        let store = SqliteVectorStore::in_memory("test").unwrap();
        let old: Vec<_> = (0..3).map(|i| entry("v", i, vec![1.0, 0.0])).collect();
        store.replace_video("v", &old).await.unwrap();
        store.put_batch(&[entry("w", 0, vec![0.0, 1.0])]).await.unwrap();

        let removed = store
            .replace_video("v", &[entry("v", 0, vec![0.5, 0.5])])
            .await
            .unwrap();
        assert_eq!(removed, 3);

        let entries = store.entries_for_video("v").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].embedding, vec![0.5, 0.5]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        let a = SqliteVectorStore::new(&path, "a").unwrap();
        a.put_batch(&[entry("v", 0, vec![1.0])]).await.unwrap();
        drop(a);

        let b = SqliteVectorStore::new(&path, "b").unwrap();
        assert_eq!(b.count().await.unwrap(), 0);
        b.reset().await.unwrap();

        let a = SqliteVectorStore::new(&path, "a").unwrap();
        assert_eq!(a.count().await.unwrap(), 1);
        assert_eq!(a.collection_name(), "a");
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.db");

        {
            let store = SqliteVectorStore::new(&path, "video_transcripts").unwrap();
            let mut e = entry("v", 1, vec![0.25, -0.5, 1.0]);
            e.metadata.start_time = Some(12.5);
            store
                .put_batch(&[entry("v", 0, vec![1.0, 0.0, 0.0]), e])
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path, "video_transcripts").unwrap();
        let entries = store.entries_for_video("v").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "v_1");
        assert_eq!(entries[1].embedding, vec![0.25, -0.5, 1.0]);
        assert_eq!(entries[1].metadata.start_time, Some(12.5));
        assert_eq!(entries[0].metadata.start_time, None);
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let store = SqliteVectorStore::in_memory("test").unwrap();
        store
            .put_batch(&[
                entry("v", 0, vec![0.0, 1.0]),
                entry("v", 1, vec![1.0, 0.0]),
                entry("v", 2, vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.query_by_vector(&[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata.chunk_index, 1);
        assert_eq!(hits[1].metadata.chunk_index, 2);
        assert!(hits[0].similarity >= hits[1].similarity);
    }
}
