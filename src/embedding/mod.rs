//! Embedding generation for semantic search and retrieval.

mod hash;
mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one vector per input in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Name of the model producing the vectors.
    fn model_name(&self) -> &str;
}

/// Create the embedder selected in configuration.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let dimensions = settings.dimensions as usize;
    Ok(match settings.provider {
        EmbeddingProvider::OpenAI => {
            Box::new(OpenAIEmbedder::with_config(&settings.model, dimensions)?)
        }
        EmbeddingProvider::Hash => Box::new(HashEmbedder::new(dimensions)),
    })
}
