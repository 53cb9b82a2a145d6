//! Configuration module for vidqa.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, GeneratorKind,
    PromptSettings, RagSettings, SegmentMapping, Settings, TranscriptSettings,
    VectorStoreSettings,
};
