//! Transcript chunking for retrieval.
//!
//! Transcripts are split into overlapping, sentence-aligned text chunks
//! ([`TextChunker`]), and each chunk is then attributed the timestamped
//! caption segments it contains ([`SegmentMapper`]).

mod segments;
mod sentence;

pub use segments::{create_mapper, OffsetMapper, SegmentMapper, SubstringMapper};
pub use sentence::TextChunker;

use crate::config::ChunkingSettings;
use crate::error::{Result, VidqaError};
use serde::{Deserialize, Serialize};

/// Markers after which a chunk may end.
pub const SENTENCE_ENDINGS: [&str; 4] = [". ", "! ", "? ", "\n\n"];

/// A chunk of transcript text.
///
/// `start` and `end` are character offsets of the untrimmed window in the
/// source text; `text` is that window with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Trimmed chunk text.
    pub text: String,
    /// Window start (character offset, inclusive).
    pub start: usize,
    /// Window end (character offset, exclusive).
    pub end: usize,
    /// Position of this chunk in the transcript, starting at 0.
    pub order: usize,
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
    /// How far back from a window end to search for a sentence boundary.
    pub boundary_window: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            boundary_window: 100,
        }
    }
}

impl ChunkingConfig {
    /// Create a validated configuration with the default boundary window.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            overlap,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the sentence boundary search window.
    pub fn with_boundary_window(mut self, boundary_window: usize) -> Self {
        self.boundary_window = boundary_window;
        self
    }

    /// Reject configurations that could not make forward progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(VidqaError::Config("chunk_size must be positive".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(VidqaError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl TryFrom<&ChunkingSettings> for ChunkingConfig {
    type Error = VidqaError;

    fn try_from(settings: &ChunkingSettings) -> Result<Self> {
        let config = ChunkingConfig::new(settings.chunk_size, settings.chunk_overlap)?
            .with_boundary_window(settings.boundary_window);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(ChunkingConfig::new(1000, 200).is_ok());
        assert!(ChunkingConfig::new(100, 99).is_ok());
        assert!(matches!(
            ChunkingConfig::new(100, 100),
            Err(VidqaError::Config(_))
        ));
        assert!(ChunkingConfig::new(100, 500).is_err());
        assert!(ChunkingConfig::new(0, 0).is_err());
    }

    #[test]
    fn test_config_from_settings() {
        let settings = ChunkingSettings {
            chunk_size: 400,
            chunk_overlap: 50,
            boundary_window: 20,
            ..ChunkingSettings::default()
        };
        let config = ChunkingConfig::try_from(&settings).unwrap();
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.overlap, 50);
        assert_eq!(config.boundary_window, 20);
    }
}
