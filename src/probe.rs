//! Environment readiness checks.
//!
//! Collaborators are probed once at startup: whether an OpenAI API key is
//! configured and whether `yt-dlp` can be run. Commands check the
//! capabilities they need before doing any work.

use crate::config::{EmbeddingProvider, GeneratorKind, Settings};
use crate::error::{Result, VidqaError};
use crate::openai::{is_api_key_configured, API_KEY_VAR};
use std::process::Command;

/// What an operation needs from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetching and indexing transcripts.
    Index,
    /// Searching the index.
    Search,
    /// Answering questions.
    Ask,
}

/// Snapshot of the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub api_key: bool,
    /// First line of `yt-dlp --version`, when it runs.
    pub yt_dlp: Option<String>,
}

impl Capabilities {
    /// Probe the current environment.
    pub fn detect() -> Self {
        Self {
            api_key: is_api_key_configured(),
            yt_dlp: tool_version("yt-dlp", "--version"),
        }
    }

    /// Check that `operation` can run with `settings`.
    ///
    /// A missing key for the answer model is not an error: answers
    /// degrade to the rule-based fallback.
    pub fn check(&self, settings: &Settings, operation: Operation) -> Result<()> {
        let needs_embedding_key = settings.embedding.provider == EmbeddingProvider::OpenAI;

        if operation == Operation::Index && self.yt_dlp.is_none() {
            return Err(VidqaError::ToolNotFound("yt-dlp".to_string()));
        }
        if needs_embedding_key && !self.api_key {
            return Err(missing_key());
        }
        Ok(())
    }

    /// Whether answers will come from the language model.
    pub fn llm_answers(&self, settings: &Settings) -> bool {
        settings.rag.generator == GeneratorKind::Llm && self.api_key
    }
}

fn missing_key() -> VidqaError {
    VidqaError::Config(format!(
        "{} not set. Set it with: export {}='sk-...' or use embedding.provider = \"hash\"",
        API_KEY_VAR, API_KEY_VAR
    ))
}

/// First line of a tool's version output, or `None` if it cannot be run.
pub fn tool_version(name: &str, arg: &str) -> Option<String> {
    let output = Command::new(name).arg(arg).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or("installed")
        .trim()
        .to_string();
    Some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(api_key: bool, yt_dlp: bool) -> Capabilities {
        Capabilities {
            api_key,
            yt_dlp: yt_dlp.then(|| "2024.08.06".to_string()),
        }
    }

    #[test]
    fn test_search_with_hash_embeddings_needs_nothing() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Hash;
        assert!(caps(false, false).check(&settings, Operation::Search).is_ok());
        assert!(caps(false, false).check(&settings, Operation::Ask).is_ok());
    }

    #[test]
    fn test_index_requires_yt_dlp() {
        let err = caps(true, false)
            .check(&Settings::default(), Operation::Index)
            .unwrap_err();
        assert!(matches!(err, VidqaError::ToolNotFound(_)));
        assert!(caps(true, true).check(&Settings::default(), Operation::Index).is_ok());
    }

    #[test]
    fn test_openai_embeddings_require_key() {
        let err = caps(false, true)
            .check(&Settings::default(), Operation::Search)
            .unwrap_err();
        assert!(matches!(err, VidqaError::Config(_)));
    }

    #[test]
    fn test_llm_answers_need_key_and_llm_generator() {
        let mut settings = Settings::default();
        assert!(caps(true, false).llm_answers(&settings));
        assert!(!caps(false, false).llm_answers(&settings));
        settings.rag.generator = GeneratorKind::Fallback;
        assert!(!caps(true, false).llm_answers(&settings));
    }

    #[test]
    fn test_missing_tool_has_no_version() {
        assert_eq!(tool_version("vidqa-no-such-tool", "--version"), None);
    }
}
