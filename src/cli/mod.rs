//! CLI module for vidqa.

pub mod commands;
mod output;

pub use output::Output;

use crate::config::GeneratorKind;
use clap::{Parser, Subcommand};

/// vidqa - ask questions about video transcripts
///
/// Index YouTube transcripts into a local vector store and answer questions
/// from the most relevant passages.
#[derive(Parser, Debug)]
#[command(name = "vidqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Answer generator to use (llm, fallback)
    #[arg(long, global = true)]
    pub generator: Option<GeneratorKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add videos to the knowledge base
    Add {
        /// YouTube URLs or video IDs
        #[arg(required = true)]
        urls: Vec<String>,

        /// Fetch transcripts again even if cached
        #[arg(short, long)]
        force_refresh: bool,
    },

    /// Ask a question about the indexed videos
    Ask {
        /// The question to ask
        question: String,

        /// Number of passages to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the passages the answer was based on
        #[arg(short, long)]
        show_sources: bool,
    },

    /// Search for relevant transcript passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List indexed videos
    List,

    /// Remove a video from the knowledge base
    Remove {
        /// Video ID to remove
        video_id: String,
    },

    /// Show knowledge base statistics
    Stats,

    /// Remove every video from the knowledge base
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Start an interactive question session
    Chat,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}
