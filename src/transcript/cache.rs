//! On-disk transcript cache.
//!
//! One pretty-printed JSON file per video, `<video_id>_transcript.json`.

use super::FetchedTranscript;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Directory-backed cache of acquired transcripts.
#[derive(Debug, Clone)]
pub struct TranscriptCache {
    dir: PathBuf,
}

impl TranscriptCache {
    /// Create a cache rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for a video.
    pub fn path_for(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{}_transcript.json", video_id))
    }

    /// Load a cached transcript, if present.
    #[instrument(skip(self))]
    pub fn load(&self, video_id: &str) -> Result<Option<FetchedTranscript>> {
        let path = self.path_for(video_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let transcript: FetchedTranscript = serde_json::from_str(&content)?;
        debug!("Loaded cached transcript from {:?}", path);
        Ok(Some(transcript))
    }

    /// Write a transcript to the cache, returning the file path.
    #[instrument(skip(self, transcript), fields(video_id = %transcript.video_id))]
    pub fn save(&self, transcript: &FetchedTranscript) -> Result<PathBuf> {
        let path = self.path_for(&transcript.video_id);
        let content = serde_json::to_string_pretty(transcript)?;
        std::fs::write(&path, content)?;
        debug!("Saved transcript to {:?}", path);
        Ok(path)
    }
}
