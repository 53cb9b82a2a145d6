//! Test doubles shared by unit tests.

use crate::embedding::{Embedder, HashEmbedder};
use crate::error::{Result, VidqaError};
use crate::rag::{AnswerGenerator, ContextPassage};
use crate::transcript::{FetchedTranscript, TranscriptSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Hash embedder that counts calls.
pub struct CountingEmbedder {
    inner: HashEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dimensions),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_name(&self) -> &str {
        "counting-test"
    }
}

/// Embedder whose model always rejects the request.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VidqaError::Model("model unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VidqaError::Model("model unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// Embedder that sleeps before answering.
pub struct SlowEmbedder(pub Duration);

#[async_trait]
impl Embedder for SlowEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        tokio::time::sleep(self.0).await;
        Ok(HashEmbedder::new(8).embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        tokio::time::sleep(self.0).await;
        let embedder = HashEmbedder::new(8);
        Ok(texts.iter().map(|t| embedder.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "slow-test"
    }
}

/// Transcript source serving prepared transcripts; unknown ids fail.
#[derive(Default)]
pub struct ScriptedSource {
    transcripts: HashMap<String, FetchedTranscript>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn with(mut self, transcript: FetchedTranscript) -> Self {
        self.transcripts
            .insert(transcript.video_id.clone(), transcript);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptSource for ScriptedSource {
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.transcripts
            .get(video_id)
            .cloned()
            .ok_or_else(|| VidqaError::Acquisition(format!("No transcripts available for {}", video_id)))
    }
}

/// Generator recording the passages it was given.
#[derive(Default)]
pub struct RecordingGenerator {
    calls: Mutex<Vec<(String, Vec<ContextPassage>)>>,
    delay: Option<Duration>,
}

impl RecordingGenerator {
    pub fn slow(delay: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            delay: Some(delay),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<ContextPassage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, question: &str, context: &[ContextPassage]) -> String {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), context.to_vec()));
        format!("answer from {} passages", context.len())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
