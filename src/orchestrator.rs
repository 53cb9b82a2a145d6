//! Retrieval orchestrator for vidqa.
//!
//! Coordinates transcript acquisition, caching, indexing and question
//! answering. Public operations never return errors for per-video failures:
//! they are logged and reported as `false`, an empty list or a message.

use crate::config::{Prompts, Settings};
use crate::error::{Result, VidqaError};
use crate::index::{IndexStats, TranscriptIndex};
use crate::rag::{create_generator, fallback_answer, AnswerGenerator, ContextPassage};
use crate::transcript::{
    extract_video_id, FetchedTranscript, TranscriptCache, TranscriptSource,
    YoutubeTranscriptSource,
};
use crate::vector_store::{IndexEntry, SearchHit, VideoRecord};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Answer returned when retrieval finds nothing.
pub const NO_INFORMATION_MESSAGE: &str = "I couldn't find any relevant information in the video \
     transcripts to answer your question. Please make sure you've added videos to the knowledge base.";

/// Per-URL outcome of a batch add.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// `(url, succeeded)` in input order.
    pub results: Vec<(String, bool)>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, url: &str, ok: bool) {
        self.results.push((url.to_string(), ok));
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// The main orchestrator for the vidqa pipeline.
pub struct Orchestrator {
    settings: Settings,
    index: TranscriptIndex,
    source: Arc<dyn TranscriptSource>,
    cache: TranscriptCache,
    generator: Arc<dyn AnswerGenerator>,
    generation_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator from configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let index = TranscriptIndex::from_settings(&settings)?;
        let source = Arc::new(YoutubeTranscriptSource::new(
            settings.transcripts.languages.clone(),
        ));
        let cache = TranscriptCache::new(settings.transcripts_dir())?;
        let generator: Arc<dyn AnswerGenerator> =
            Arc::from(create_generator(&settings.rag, prompts)?);

        info!(
            "Using {} embeddings and the {} answer generator",
            settings.embedding.provider,
            generator.name()
        );

        Ok(Self::with_components(settings, index, source, cache, generator))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        index: TranscriptIndex,
        source: Arc<dyn TranscriptSource>,
        cache: TranscriptCache,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        let generation_timeout = Duration::from_secs(settings.rag.timeout_seconds);
        Self {
            settings,
            index,
            source,
            cache,
            generator,
            generation_timeout,
        }
    }

    /// Deadline for one answer generation.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn index(&self) -> &TranscriptIndex {
        &self.index
    }

    /// Acquire (or load from cache) and index one video.
    ///
    /// Returns `false` on any failure; the cause is logged.
    #[instrument(skip(self))]
    pub async fn add_video(&self, url: &str, force_refresh: bool) -> bool {
        match self.try_add_video(url, force_refresh).await {
            Ok(chunks) => {
                info!("Added {} ({} chunks)", url, chunks);
                true
            }
            Err(e) => {
                if e.is_backend() {
                    error!("Index backend failed while adding {}: {}", url, e);
                } else {
                    warn!("Failed to add {}: {}", url, e);
                }
                false
            }
        }
    }

    async fn try_add_video(&self, url: &str, force_refresh: bool) -> Result<usize> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| VidqaError::InvalidInput(format!("Could not parse video id from {}", url)))?;

        let transcript = self.transcript_for(&video_id, force_refresh).await?;
        self.index
            .index_video(
                &video_id,
                &transcript.metadata,
                &transcript.transcript,
                &transcript.segments,
            )
            .await
    }

    async fn transcript_for(&self, video_id: &str, force_refresh: bool) -> Result<FetchedTranscript> {
        if !force_refresh {
            match self.cache.load(video_id) {
                Ok(Some(cached)) => {
                    info!("Using cached transcript for {}", video_id);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cached transcript for {}: {}", video_id, e),
            }
        }

        let transcript = self.source.fetch(video_id).await?;
        if let Err(e) = self.cache.save(&transcript) {
            warn!("Failed to cache transcript for {}: {}", video_id, e);
        }
        Ok(transcript)
    }

    /// Add several videos, isolating failures per URL.
    pub async fn add_videos(&self, urls: &[String], force_refresh: bool) -> BatchReport {
        let mut report = BatchReport::default();
        for url in urls {
            let ok = self.add_video(url, force_refresh).await;
            report.record(url, ok);
        }

        info!(
            "Batch add finished: {}/{} succeeded",
            report.succeeded,
            report.total()
        );
        report
    }

    /// Answer a question from the indexed transcripts.
    #[instrument(skip(self))]
    pub async fn ask_question(&self, question: &str, top_k: Option<usize>) -> String {
        let hits = match self.index.search(question, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                error!("Search failed: {}", e);
                return format!("I encountered an error while processing your question: {}", e);
            }
        };

        if hits.is_empty() {
            return NO_INFORMATION_MESSAGE.to_string();
        }

        let passages: Vec<ContextPassage> = hits.into_iter().map(ContextPassage::from).collect();
        match tokio::time::timeout(
            self.generation_timeout,
            self.generator.generate(question, &passages),
        )
        .await
        {
            Ok(answer) => answer,
            Err(_) => {
                warn!(
                    "Answer generation timed out after {}s, using fallback",
                    self.generation_timeout.as_secs()
                );
                fallback_answer(question, &passages)
            }
        }
    }

    /// Passages relevant to a question, without generating an answer.
    pub async fn relevant_sources(&self, question: &str, top_k: Option<usize>) -> Vec<SearchHit> {
        self.index.search(question, top_k).await.unwrap_or_else(|e| {
            error!("Search failed: {}", e);
            Vec::new()
        })
    }

    /// Remove a video; `true` iff any chunk was removed.
    pub async fn remove_video(&self, video_id: &str) -> bool {
        match self.index.remove_video(video_id).await {
            Ok(removed) => removed > 0,
            Err(e) => {
                error!("Failed to remove {}: {}", video_id, e);
                false
            }
        }
    }

    pub async fn list_videos(&self) -> Vec<VideoRecord> {
        self.index.list_videos().await.unwrap_or_else(|e| {
            error!("Failed to list videos: {}", e);
            Vec::new()
        })
    }

    /// Chunks of one video, ordered by chunk index.
    pub async fn video_chunks(&self, video_id: &str) -> Vec<IndexEntry> {
        self.index.video_chunks(video_id).await.unwrap_or_else(|e| {
            error!("Failed to load chunks for {}: {}", video_id, e);
            Vec::new()
        })
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.index.stats().await
    }

    /// Remove every indexed video.
    pub async fn clear_knowledge_base(&self) -> bool {
        match self.index.clear().await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to clear knowledge base: {}", e);
                false
            }
        }
    }
}
