//! Transcript acquisition for vidqa.
//!
//! The retrieval core consumes transcripts through the [`TranscriptSource`]
//! trait; [`YoutubeTranscriptSource`] is the production implementation and
//! [`TranscriptCache`] keeps one JSON file per video so that re-indexing
//! does not hit the network.

mod cache;
mod models;
mod youtube;

pub use cache::TranscriptCache;
pub use models::{format_timestamp, watch_url, FetchedTranscript, TranscriptSegment, VideoMetadata};
pub use youtube::{extract_video_id, YoutubeTranscriptSource};

use crate::error::Result;
use async_trait::async_trait;

/// Producer of transcripts for video ids.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch metadata, transcript text and timestamped segments for a video.
    ///
    /// Failure means "no transcript available"; callers do not retry.
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript>;
}
