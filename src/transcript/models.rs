//! Data models for transcripts and video metadata.

use serde::{Deserialize, Serialize};

/// A single caption segment with timing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Caption text.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Metadata about a video as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub uploader: String,
    /// Duration in seconds (0 when unknown).
    #[serde(default)]
    pub duration: f64,
    /// Upload date as reported (YYYYMMDD for YouTube).
    pub upload_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub view_count: u64,
    pub url: String,
}

impl VideoMetadata {
    /// Metadata used when the platform could not be queried.
    pub fn placeholder(video_id: &str) -> Self {
        Self {
            title: format!("Video {}", video_id),
            uploader: "Unknown".to_string(),
            duration: 0.0,
            upload_date: "Unknown".to_string(),
            description: String::new(),
            view_count: 0,
            url: watch_url(video_id),
        }
    }
}

/// A transcript acquired for one video, in the on-disk cache layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub metadata: VideoMetadata,
    /// Full transcript text.
    pub transcript: String,
    /// Timestamped segments, ordered by start.
    pub segments: Vec<TranscriptSegment>,
    /// Caption language code.
    pub language: String,
}

impl FetchedTranscript {
    /// Build a transcript whose text is the segment texts joined by newlines.
    pub fn from_segments(
        video_id: String,
        metadata: VideoMetadata,
        segments: Vec<TranscriptSegment>,
        language: String,
    ) -> Self {
        let transcript = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            video_id,
            metadata,
            transcript,
            segments,
            language,
        }
    }
}

/// Canonical watch URL for a YouTube video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.4), "01:05");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
    }

    #[test]
    fn test_from_segments_joins_lines() {
        let segments = vec![
            TranscriptSegment::new(0.0, 2.5, "Hello there"),
            TranscriptSegment::new(2.5, 3.0, "general overview"),
        ];
        let fetched = FetchedTranscript::from_segments(
            "abc".to_string(),
            VideoMetadata::placeholder("abc"),
            segments,
            "en".to_string(),
        );

        assert_eq!(fetched.transcript, "Hello there\ngeneral overview");
        assert_eq!(fetched.segments[1].end(), 5.5);
        assert_eq!(fetched.metadata.title, "Video abc");
        assert_eq!(fetched.metadata.url, "https://www.youtube.com/watch?v=abc");
    }
}
