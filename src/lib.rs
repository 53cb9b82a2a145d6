//! vidqa - question answering over video transcripts
//!
//! A local-first retrieval core for YouTube transcripts: fetch captions,
//! split them into overlapping chunks, embed and index the chunks, and
//! answer questions from the most similar passages.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `transcript` - Transcript acquisition and caching
//! - `chunking` - Sentence-aligned chunking and segment attribution
//! - `embedding` - Embedding generation
//! - `vector_store` - Persistent similarity index
//! - `index` - Transcript indexing and search
//! - `rag` - Answer generation
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidqa::config::Settings;
//! use vidqa::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     if orchestrator.add_video("dQw4w9WgXcQ", false).await {
//!         let answer = orchestrator.ask_question("What is this video about?", None).await;
//!         println!("{}", answer);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod probe;
pub mod rag;
pub mod transcript;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{Result, VidqaError};
