//! Sentence-aligned sliding-window chunker.

use super::{ChunkingConfig, TextChunk, SENTENCE_ENDINGS};
use crate::error::Result;
use tracing::debug;

/// Splits text into overlapping windows that prefer to end at a sentence
/// boundary.
///
/// Lengths and offsets are in characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a chunker, rejecting configurations with `overlap >= chunk_size`.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split `text` into trimmed, non-empty chunk strings.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.split(text).into_iter().map(|c| c.text).collect()
    }

    /// Split `text` into chunks, keeping each chunk's window offsets.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let ChunkingConfig {
            chunk_size,
            overlap,
            ..
        } = self.config;

        if len == 0 {
            return Vec::new();
        }

        if len <= chunk_size {
            return vec![TextChunk {
                text: text.to_string(),
                start: 0,
                end: len,
                order: 0,
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let window_end = start + chunk_size;
            let end = if window_end >= len {
                len
            } else {
                let boundary = self.find_boundary(&chars, start, window_end);
                // A boundary that would not let the next window move forward is ignored.
                if boundary.saturating_sub(overlap) > start {
                    boundary
                } else {
                    window_end
                }
            };

            let window: String = chars[start..end].iter().collect();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    text: trimmed.to_string(),
                    start,
                    end,
                    order: chunks.len(),
                });
            }

            if end >= len {
                break;
            }
            start = end - overlap;
        }

        debug!(
            "Split {} characters into {} chunks (size {}, overlap {})",
            len,
            chunks.len(),
            chunk_size,
            overlap
        );
        chunks
    }

    /// Position just after the last sentence ending in the search window
    /// before `end`, or `end` itself when there is none.
    fn find_boundary(&self, chars: &[char], start: usize, end: usize) -> usize {
        let from = end
            .saturating_sub(self.config.boundary_window)
            .max(start + 1);

        let mut best = end;
        for i in from..end {
            if i + 2 > chars.len() {
                break;
            }
            let pair = [chars[i], chars[i + 1]];
            if SENTENCE_ENDINGS.iter().any(|ending| {
                let mut e = ending.chars();
                e.next() == Some(pair[0]) && e.next() == Some(pair[1])
            }) {
                best = i + 2;
            }
        }
        best
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}
