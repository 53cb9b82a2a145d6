//! Stats command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;

/// Run the stats command.
pub async fn run_stats(settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Search)?;
    let stats = orchestrator.stats().await?;

    Output::header("Knowledge Base");
    Output::kv("Videos", &stats.total_videos.to_string());
    Output::kv("Chunks", &stats.total_chunks.to_string());
    Output::kv("Collection", &stats.collection_name);
    Output::kv("Embedding model", &stats.embedding_model);

    Ok(())
}
