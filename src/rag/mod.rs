//! Answer generation over retrieved transcript passages.
//!
//! Generators never fail: model errors degrade to [`fallback_answer`].

mod context;
mod fallback;
mod llm;

pub use context::{format_context, short_timestamp};
pub use fallback::{fallback_answer, FallbackAnswerGenerator};
pub use llm::{clean_response, LlmAnswerGenerator};

use crate::config::{GeneratorKind, Prompts, RagSettings};
use crate::error::Result;
use crate::vector_store::{EntryMetadata, SearchHit};
use async_trait::async_trait;
use serde::Serialize;

/// A retrieved passage handed to a generator, most relevant first.
#[derive(Debug, Clone, Serialize)]
pub struct ContextPassage {
    pub document: String,
    pub metadata: EntryMetadata,
    pub similarity: f32,
}

impl From<SearchHit> for ContextPassage {
    fn from(hit: SearchHit) -> Self {
        Self {
            document: hit.document,
            metadata: hit.metadata,
            similarity: hit.similarity,
        }
    }
}

/// Produces an answer to a question from ranked passages.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Answer `question` using `context`. Never fails.
    async fn generate(&self, question: &str, context: &[ContextPassage]) -> String;

    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;
}

/// Create the generator selected in configuration.
pub fn create_generator(
    settings: &RagSettings,
    prompts: Prompts,
) -> Result<Box<dyn AnswerGenerator>> {
    Ok(match settings.generator {
        GeneratorKind::Llm => Box::new(LlmAnswerGenerator::new(settings, prompts)?),
        GeneratorKind::Fallback => Box::new(FallbackAnswerGenerator),
    })
}
