//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets. Entries keep insertion order.

use super::{rank, EntryMetadata, IndexEntry, SearchHit, VectorStore};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory vector store.
pub struct MemoryVectorStore {
    entries: RwLock<Vec<IndexEntry>>,
    collection: String,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new(collection: &str) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            collection: collection.to_string(),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<IndexEntry>>> {
        self.entries
            .read()
            .map_err(|e| VidqaError::IndexBackend(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<IndexEntry>>> {
        self.entries
            .write()
            .map_err(|e| VidqaError::IndexBackend(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new("video_transcripts")
    }
}

fn upsert(store: &mut Vec<IndexEntry>, entry: &IndexEntry) {
    store.retain(|e| e.id != entry.id);
    store.push(entry.clone());
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    async fn replace_video(&self, video_id: &str, entries: &[IndexEntry]) -> Result<usize> {
        let mut store = self.write()?;
        let before = store.len();
        store.retain(|e| e.metadata.video_id != video_id);
        let removed = before - store.len();
        for entry in entries {
            upsert(&mut store, entry);
        }
        Ok(removed)
    }

    async fn put_batch(&self, entries: &[IndexEntry]) -> Result<usize> {
        let mut store = self.write()?;
        for entry in entries {
            upsert(&mut store, entry);
        }
        Ok(entries.len())
    }

    async fn query_by_vector(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let store = self.read()?;
        let hits = store
            .iter()
            .map(|e| SearchHit::new(e.document.clone(), e.metadata.clone(), embedding, &e.embedding))
            .collect();
        Ok(rank(hits, limit))
    }

    async fn delete_where_video(&self, video_id: &str) -> Result<usize> {
        let mut store = self.write()?;
        let before = store.len();
        store.retain(|e| e.metadata.video_id != video_id);
        Ok(before - store.len())
    }

    async fn entries_for_video(&self, video_id: &str) -> Result<Vec<IndexEntry>> {
        let store = self.read()?;
        let mut entries: Vec<IndexEntry> = store
            .iter()
            .filter(|e| e.metadata.video_id == video_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.metadata.chunk_index);
        Ok(entries)
    }

    async fn all_metadata(&self) -> Result<Vec<(EntryMetadata, DateTime<Utc>)>> {
        let store = self.read()?;
        Ok(store
            .iter()
            .map(|e| (e.metadata.clone(), e.indexed_at))
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    async fn reset(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}
