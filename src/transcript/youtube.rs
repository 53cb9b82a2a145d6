//! YouTube transcript source.
//!
//! Metadata and the list of caption tracks come from `yt-dlp --dump-json`;
//! the chosen track is downloaded in YouTube's `json3` caption format.

use super::{watch_url, FetchedTranscript, TranscriptSegment, TranscriptSource, VideoMetadata};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, info, instrument, warn};

const CAPTION_FORMAT: &str = "json3";

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    })
}

/// Extract a video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Some(caps) = video_id_regex().captures(input) {
        return caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string());
    }

    // watch URLs with `v` somewhere later in the query string
    let parsed = url::Url::parse(input).ok()?;
    let host = parsed.host_str()?;
    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| is_video_id(id))
}

/// Whether `id` has the shape of a YouTube video ID.
fn is_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// YouTube transcript source backed by yt-dlp.
pub struct YoutubeTranscriptSource {
    languages: Vec<String>,
    http: reqwest::Client,
}

impl YoutubeTranscriptSource {
    /// Create a source preferring the given caption languages, in order.
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            languages,
            http: reqwest::Client::new(),
        }
    }

    /// Run yt-dlp and return its JSON description of the video.
    async fn dump_info(&self, video_id: &str) -> Result<Value> {
        let url = watch_url(video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--skip-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidqaError::ToolNotFound("yt-dlp".to_string())
                } else {
                    VidqaError::Acquisition(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidqaError::Acquisition(format!(
                "Video {} not found or unavailable: {}",
                video_id,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            VidqaError::Acquisition(format!("Failed to parse yt-dlp output: {}", e))
        })
    }

    async fn download_track(&self, url: &str) -> Result<Vec<TranscriptSegment>> {
        let captions: Json3Captions = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_json3(captions))
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new(vec!["en".to_string()])
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript> {
        let info = self.dump_info(video_id).await?;
        let metadata = metadata_from_info(video_id, &info);

        let (language, track_url) = select_track(&info, &self.languages).ok_or_else(|| {
            VidqaError::Acquisition(format!("No transcripts available for {}", video_id))
        })?;
        debug!("Using {} captions for {}", language, video_id);

        let segments = self.download_track(&track_url).await.map_err(|e| {
            VidqaError::Acquisition(format!("Failed to download captions: {}", e))
        })?;

        if segments.is_empty() {
            warn!("Caption track for {} contained no text", video_id);
            return Err(VidqaError::Acquisition(format!(
                "Empty transcript for {}",
                video_id
            )));
        }

        info!("Fetched {} caption segments for '{}'", segments.len(), metadata.title);
        Ok(FetchedTranscript::from_segments(
            video_id.to_string(),
            metadata,
            segments,
            language,
        ))
    }
}

/// Build metadata from yt-dlp JSON, defaulting any missing field.
fn metadata_from_info(video_id: &str, info: &Value) -> VideoMetadata {
    let defaults = VideoMetadata::placeholder(video_id);

    VideoMetadata {
        title: info["title"]
            .as_str()
            .map(str::to_string)
            .unwrap_or(defaults.title),
        uploader: info["uploader"]
            .as_str()
            .or_else(|| info["channel"].as_str())
            .map(str::to_string)
            .unwrap_or(defaults.uploader),
        duration: info["duration"].as_f64().unwrap_or(defaults.duration),
        upload_date: info["upload_date"]
            .as_str()
            .map(str::to_string)
            .unwrap_or(defaults.upload_date),
        description: info["description"]
            .as_str()
            .map(str::to_string)
            .unwrap_or(defaults.description),
        view_count: info["view_count"].as_u64().unwrap_or(defaults.view_count),
        url: defaults.url,
    }
}

/// Pick a caption track: preferred manual subtitles, then auto-generated
/// English, then anything available.
fn select_track(info: &Value, languages: &[String]) -> Option<(String, String)> {
    let manual = info["subtitles"].as_object();
    let automatic = info["automatic_captions"].as_object();

    let json3_url = |tracks: &Value| -> Option<String> {
        tracks
            .as_array()?
            .iter()
            .find(|t| t["ext"].as_str() == Some(CAPTION_FORMAT))
            .and_then(|t| t["url"].as_str())
            .map(str::to_string)
    };

    if let Some(manual) = manual {
        for lang in languages {
            if let Some(url) = manual.get(lang).and_then(json3_url) {
                return Some((lang.clone(), url));
            }
        }
    }

    if let Some(url) = automatic.and_then(|a| a.get("en")).and_then(json3_url) {
        return Some(("en".to_string(), url));
    }

    manual
        .into_iter()
        .chain(automatic)
        .flat_map(|tracks| tracks.iter())
        .find_map(|(lang, tracks)| json3_url(tracks).map(|url| (lang.clone(), url)))
}

#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: f64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: f64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

fn parse_json3(captions: Json3Captions) -> Vec<TranscriptSegment> {
    captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                event.start_ms / 1000.0,
                event.duration_ms / 1000.0,
                text,
            ))
        })
        .collect()
}
