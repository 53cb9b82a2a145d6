//! Embedding index over transcript chunks.
//!
//! [`TranscriptIndex`] turns a transcript into chunk entries (chunking,
//! segment attribution, metadata, embeddings) and stores them in a
//! [`VectorStore`]. Writes to the store are serialized; a re-index swaps a
//! video's entries in a single backend transaction once every chunk has been
//! embedded, so a failed embedding leaves the previous entries in place.

use crate::chunking::{create_mapper, ChunkingConfig, SegmentMapper, TextChunker};
use crate::config::Settings;
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, VidqaError};
use crate::transcript::{TranscriptSegment, VideoMetadata};
use crate::vector_store::{
    group_videos, EntryMetadata, IndexEntry, MemoryVectorStore, SearchHit, SqliteVectorStore,
    VectorStore, VideoRecord,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

const DEFAULT_TOP_K: usize = 5;
const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(60);

/// Counters describing the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_chunks: usize,
    pub total_videos: usize,
    pub collection_name: String,
    pub embedding_model: String,
}

/// Chunk, embed, store and search video transcripts.
pub struct TranscriptIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    chunker: TextChunker,
    mapper: Box<dyn SegmentMapper>,
    default_top_k: usize,
    embed_timeout: Duration,
    writer: Mutex<()>,
}

impl TranscriptIndex {
    /// Create an index with default chunking, substring segment mapping,
    /// top-k of 5 and a 60 second embedding deadline.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            chunker: TextChunker::default(),
            mapper: create_mapper(Default::default()),
            default_top_k: DEFAULT_TOP_K,
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            writer: Mutex::new(()),
        }
    }

    /// Build the store, embedder and chunking pipeline described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let collection = &settings.vector_store.collection_name;
        let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "sqlite" => Arc::new(SqliteVectorStore::new(&settings.sqlite_path(), collection)?),
            "memory" => Arc::new(MemoryVectorStore::new(collection)),
            other => {
                return Err(VidqaError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };
        let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&settings.embedding)?);

        Ok(Self::new(store, embedder)
            .with_chunker(TextChunker::new(ChunkingConfig::try_from(&settings.chunking)?)?)
            .with_mapper(create_mapper(settings.chunking.segment_mapping))
            .with_top_k(settings.rag.top_k)
            .with_embed_timeout(Duration::from_secs(settings.embedding.timeout_seconds)))
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_mapper(mut self, mapper: Box<dyn SegmentMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Number of results returned when a search does not name one.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// Deadline for each embedding call.
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Index (or re-index) one video, returning the number of chunks stored.
    #[instrument(skip(self, metadata, text, segments), fields(chars = text.len(), segments = segments.len()))]
    pub async fn index_video(
        &self,
        video_id: &str,
        metadata: &VideoMetadata,
        text: &str,
        segments: &[TranscriptSegment],
    ) -> Result<usize> {
        let chunks = self.chunker.split(text);

        if chunks.is_empty() {
            warn!("Transcript for {} produced no chunks", video_id);
            let _guard = self.writer.lock().await;
            self.store.delete_where_video(video_id).await?;
            return Ok(0);
        }

        let assigned = self.mapper.assign(&chunks, text, segments);
        let documents: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

        let embeddings = self
            .with_deadline("embedding", self.embedder.embed_batch(&documents))
            .await?;
        if embeddings.len() != documents.len() {
            return Err(VidqaError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                documents.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(assigned)
            .zip(documents.into_iter().zip(embeddings))
            .map(|((chunk, segs), (document, embedding))| {
                let meta = chunk_metadata(video_id, metadata, chunk.order, &document, &segs);
                IndexEntry::new(document, embedding, meta)
            })
            .collect();

        let _guard = self.writer.lock().await;
        let replaced = self.store.replace_video(video_id, &entries).await?;
        if replaced > 0 {
            debug!("Replaced {} previous entries for {}", replaced, video_id);
        }

        info!("Indexed {} chunks for video {}", entries.len(), video_id);
        Ok(entries.len())
    }

    /// Nearest chunks to `query`, most similar first.
    ///
    /// `top_k` falls back to the configured default. An empty index returns
    /// no hits without embedding the query.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Result<Vec<SearchHit>> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        if top_k == 0 || self.store.count().await? == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .with_deadline("query embedding", self.embedder.embed(query))
            .await?;

        let hits = self.store.query_by_vector(&query_embedding, top_k).await?;
        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }

    /// Remove every chunk of a video, returning how many were removed.
    #[instrument(skip(self))]
    pub async fn remove_video(&self, video_id: &str) -> Result<usize> {
        let _guard = self.writer.lock().await;
        self.store.delete_where_video(video_id).await
    }

    /// One record per indexed video, in order of first insertion.
    pub async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        Ok(group_videos(self.store.all_metadata().await?))
    }

    /// All chunks of one video, ordered by chunk index.
    pub async fn video_chunks(&self, video_id: &str) -> Result<Vec<IndexEntry>> {
        self.store.entries_for_video(video_id).await
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            total_chunks: self.store.count().await?,
            total_videos: self.list_videos().await?.len(),
            collection_name: self.store.collection_name().to_string(),
            embedding_model: self.embedder.model_name().to_string(),
        })
    }

    /// Delete every entry of the collection.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.store.reset().await?;
        info!("Cleared collection {}", self.store.collection_name());
        Ok(())
    }

    async fn with_deadline<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.embed_timeout, fut)
            .await
            .map_err(|_| VidqaError::Timeout {
                operation: operation.to_string(),
                seconds: self.embed_timeout.as_secs(),
            })?
    }
}

fn or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}

fn chunk_metadata(
    video_id: &str,
    video: &VideoMetadata,
    chunk_index: usize,
    document: &str,
    segments: &[&TranscriptSegment],
) -> EntryMetadata {
    let start_time = segments.iter().map(|s| s.start).reduce(f64::min);
    let end_time = segments.iter().map(|s| s.end()).reduce(f64::max);

    EntryMetadata {
        video_id: video_id.to_string(),
        chunk_index,
        video_title: or_unknown(&video.title),
        uploader: or_unknown(&video.uploader),
        upload_date: or_unknown(&video.upload_date),
        video_url: video.url.clone(),
        duration: video.duration,
        segments_count: segments.len(),
        text_length: document.chars().count(),
        start_time,
        end_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::OffsetMapper;
    use crate::testing::{CountingEmbedder, FailingEmbedder, SlowEmbedder};
    use crate::transcript::watch_url;
    use tokio_test::assert_ok;

    fn metadata(title: &str) -> VideoMetadata {
        VideoMetadata {
            title: title.to_string(),
            uploader: "Ferris".to_string(),
            duration: 600.0,
            upload_date: "20240301".to_string(),
            description: String::new(),
            view_count: 10,
            url: watch_url("vid00000001"),
        }
    }

    fn sentence_text(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence number {} talks about lifetimes and traits. ", i))
            .collect()
    }

    fn index_with(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> TranscriptIndex {
        TranscriptIndex::new(store, embedder)
    }

    #[tokio::test]
    async fn test_reindex_replaces_previous_entries() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::default());
        let index = index_with(store.clone(), Arc::new(CountingEmbedder::new(64)));

        let long = sentence_text(80);
        let first = index
            .index_video("vid00000001", &metadata("One"), &long, &[])
            .await
            .unwrap();
        assert!(first > 1);

        let second = index
            .index_video("vid00000001", &metadata("One v2"), "A short replacement.", &[])
            .await
            .unwrap();
        assert_eq!(second, 1);

        let chunks = index.video_chunks("vid00000001").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "vid00000001_0");
        assert_eq!(chunks[0].metadata.video_title, "One v2");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_chunk_indices_are_contiguous() {
        let index = index_with(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(CountingEmbedder::new(32)),
        );
        let count = index
            .index_video("vid00000001", &metadata("T"), &sentence_text(100), &[])
            .await
            .unwrap();

        let chunks = index.video_chunks("vid00000001").await.unwrap();
        let indices: Vec<usize> = chunks.iter().map(|c| c.metadata.chunk_index).collect();
        assert_eq!(indices, (0..count).collect::<Vec<_>>());
        for chunk in &chunks {
            assert_eq!(chunk.metadata.text_length, chunk.document.chars().count());
        }
    }

    #[tokio::test]
    async fn test_failed_reembedding_keeps_previous_entries() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::default());
        let good = index_with(store.clone(), Arc::new(CountingEmbedder::new(16)));
        good.index_video("vid00000001", &metadata("Kept"), &sentence_text(40), &[])
            .await
            .unwrap();
        let before = store.count().await.unwrap();

        let failing = index_with(store.clone(), Arc::new(FailingEmbedder));
        let err = failing
            .index_video("vid00000001", &metadata("Lost"), "New text.", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, VidqaError::Model(_)));
        assert!(!err.is_retryable());

        assert_eq!(store.count().await.unwrap(), before);
        let chunks = good.video_chunks("vid00000001").await.unwrap();
        assert_eq!(chunks[0].metadata.video_title, "Kept");
    }

    #[tokio::test]
    async fn test_embedding_timeout_is_retryable() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::default());
        let index = index_with(store.clone(), Arc::new(SlowEmbedder(Duration::from_secs(5))))
            .with_embed_timeout(Duration::from_millis(20));

        let err = index
            .index_video("vid00000001", &metadata("T"), "Some text.", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, VidqaError::Timeout { .. }));
        assert!(err.is_retryable());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_on_empty_index_skips_embedder() {
        let embedder = Arc::new(CountingEmbedder::new(8));
        let index = index_with(Arc::new(MemoryVectorStore::default()), embedder.clone());

        let hits = index.search("anything", None).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_and_respects_top_k() {
        let index = index_with(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(CountingEmbedder::new(256)),
        )
        .with_chunker(TextChunker::new(ChunkingConfig::new(60, 10).unwrap()).unwrap());

        let text = "The borrow checker enforces aliasing rules. \
                    Async runtimes schedule futures cooperatively. \
                    Cargo resolves dependency versions. \
                    The borrow checker tracks lifetimes of references.";
        index
            .index_video("vid00000001", &metadata("Rust"), text, &[])
            .await
            .unwrap();

        let hits = index.search("borrow checker", Some(2)).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].similarity >= hits[1].similarity);
        assert!(hits[0].document.contains("borrow checker"));

        assert!(index.search("borrow checker", Some(0)).await.unwrap().is_empty());
        let all = index.search("borrow checker", Some(100)).await.unwrap();
        assert_eq!(all.len(), index.stats().await.unwrap().total_chunks);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let index = index_with(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(CountingEmbedder::new(8)),
        );
        index
            .index_video("vid00000001", &metadata("T"), "Text to remove.", &[])
            .await
            .unwrap();

        assert_eq!(index.remove_video("vid00000001").await.unwrap(), 1);
        assert_eq!(index.remove_video("vid00000001").await.unwrap(), 0);
        assert_eq!(index.remove_video("never-added").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_transcript_removes_video() {
        let index = index_with(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(CountingEmbedder::new(8)),
        );
        index
            .index_video("vid00000001", &metadata("T"), "Old text.", &[])
            .await
            .unwrap();

        let count = index
            .index_video("vid00000001", &metadata("T"), "", &[])
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(index.list_videos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_segment_times_in_metadata() {
        let index = index_with(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(CountingEmbedder::new(8)),
        )
        .with_mapper(Box::new(OffsetMapper));

        let segments = vec![
            TranscriptSegment::new(1.0, 2.0, "hello there"),
            TranscriptSegment::new(3.0, 4.5, "general kenobi"),
        ];
        let text = "hello there\ngeneral kenobi";
        index
            .index_video("vid00000001", &metadata("T"), text, &segments)
            .await
            .unwrap();

        let chunk = &index.video_chunks("vid00000001").await.unwrap()[0];
        assert_eq!(chunk.metadata.segments_count, 2);
        assert_eq!(chunk.metadata.start_time, Some(1.0));
        assert_eq!(chunk.metadata.end_time, Some(7.5));
    }

    #[tokio::test]
    async fn test_missing_metadata_defaults_to_unknown() {
        let index = index_with(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(CountingEmbedder::new(8)),
        );
        let mut meta = metadata("");
        meta.uploader = String::new();
        meta.url = String::new();
        index
            .index_video("vid00000001", &meta, "Some words.", &[])
            .await
            .unwrap();

        let videos = index.list_videos().await.unwrap();
        assert_eq!(videos[0].title, "Unknown");
        assert_eq!(videos[0].uploader, "Unknown");
        assert_eq!(videos[0].url, "");
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let index = index_with(
            Arc::new(MemoryVectorStore::new("test_collection")),
            Arc::new(CountingEmbedder::new(8)),
        );
        assert_ok!(index.index_video("a0000000001", &metadata("A"), "First.", &[]).await);
        assert_ok!(index.index_video("b0000000002", &metadata("B"), "Second.", &[]).await);

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.collection_name, "test_collection");
        assert_eq!(stats.embedding_model, "counting-test");

        let videos = index.list_videos().await.unwrap();
        assert_eq!(videos[0].video_id, "a0000000001");
        assert_eq!(videos[1].video_id, "b0000000002");

        index.clear().await.unwrap();
        assert_eq!(index.stats().await.unwrap().total_chunks, 0);
        assert!(index.search("first", None).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_settings_rejects_unknown_provider() {
        let mut settings = Settings::default();
        settings.vector_store.provider = "chroma".to_string();
        assert!(matches!(
            TranscriptIndex::from_settings(&settings),
            Err(VidqaError::Config(_))
        ));
    }
}
