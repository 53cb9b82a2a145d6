//! Vector store abstraction for vidqa.
//!
//! Provides a trait-based interface for the persisted state of one
//! collection of transcript chunks.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata stored with every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub video_id: String,
    /// Position of the chunk within its video, contiguous from 0.
    pub chunk_index: usize,
    pub video_title: String,
    pub uploader: String,
    pub upload_date: String,
    pub video_url: String,
    /// Video duration in seconds.
    pub duration: f64,
    /// Number of caption segments attributed to the chunk.
    pub segments_count: usize,
    /// Chunk length in characters.
    pub text_length: usize,
    /// Earliest start of the attributed segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    /// Latest end of the attributed segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

/// A chunk as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// `<video_id>_<chunk_index>`.
    pub id: String,
    /// Chunk text the embedding was computed from.
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: EntryMetadata,
    pub indexed_at: DateTime<Utc>,
}

impl IndexEntry {
    /// Create an entry, deriving its id from the metadata.
    pub fn new(document: String, embedding: Vec<f32>, metadata: EntryMetadata) -> Self {
        Self {
            id: Self::entry_id(&metadata.video_id, metadata.chunk_index),
            document,
            embedding,
            metadata,
            indexed_at: Utc::now(),
        }
    }

    pub fn entry_id(video_id: &str, chunk_index: usize) -> String {
        format!("{}_{}", video_id, chunk_index)
    }
}

/// A search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: String,
    pub metadata: EntryMetadata,
    /// Cosine distance to the query.
    pub distance: f32,
    /// `1 - distance`; higher is better.
    pub similarity: f32,
}

impl SearchHit {
    pub fn new(document: String, metadata: EntryMetadata, query: &[f32], embedding: &[f32]) -> Self {
        let distance = cosine_distance(query, embedding);
        Self {
            document,
            metadata,
            distance,
            similarity: 1.0 - distance,
        }
    }
}

/// Summary information about an indexed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub uploader: String,
    pub upload_date: String,
    pub url: String,
    pub duration: f64,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
}

/// Aggregate per-chunk metadata into one record per video, in order of each
/// video's first appearance.
pub fn group_videos<I>(rows: I) -> Vec<VideoRecord>
where
    I: IntoIterator<Item = (EntryMetadata, DateTime<Utc>)>,
{
    let mut videos: Vec<VideoRecord> = Vec::new();

    for (meta, indexed_at) in rows {
        match videos.iter_mut().find(|v| v.video_id == meta.video_id) {
            Some(video) => {
                video.chunk_count += 1;
                video.indexed_at = video.indexed_at.max(indexed_at);
            }
            None => videos.push(VideoRecord {
                video_id: meta.video_id,
                title: meta.video_title,
                uploader: meta.uploader,
                upload_date: meta.upload_date,
                url: meta.video_url,
                duration: meta.duration,
                chunk_count: 1,
                indexed_at,
            }),
        }
    }

    videos
}

/// Trait for vector store implementations.
///
/// A store holds exactly one named collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection this store holds.
    fn collection_name(&self) -> &str;

    /// Replace every entry of a video with `entries` in one transaction.
    ///
    /// Returns the number of entries removed.
    async fn replace_video(&self, video_id: &str, entries: &[IndexEntry]) -> Result<usize>;

    /// Insert or overwrite entries by id, leaving other entries of the
    /// same video in place.
    ///
    /// Indexing goes through [`VectorStore::replace_video`]; this is for
    /// seeding a store directly, as the store tests do.
    async fn put_batch(&self, entries: &[IndexEntry]) -> Result<usize>;

    /// The `limit` entries nearest to `embedding`, most similar first.
    async fn query_by_vector(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>>;

    /// Delete all entries of a video, returning how many were removed.
    async fn delete_where_video(&self, video_id: &str) -> Result<usize>;

    /// All entries of a video, ordered by chunk index.
    async fn entries_for_video(&self, video_id: &str) -> Result<Vec<IndexEntry>>;

    /// Metadata of every entry, in insertion order.
    async fn all_metadata(&self) -> Result<Vec<(EntryMetadata, DateTime<Utc>)>>;

    /// Total number of entries.
    async fn count(&self) -> Result<usize>;

    /// Drop the collection and recreate it empty.
    async fn reset(&self) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, `1 - cosine_similarity`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Sort hits by descending similarity and keep the first `limit`.
pub(crate) fn rank(mut hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}
