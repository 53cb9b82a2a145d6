//! List command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Search)?;
    let videos = orchestrator.list_videos().await;

    if videos.is_empty() {
        Output::info("No videos indexed yet. Use 'vidqa add <url>' to add content.");
        return Ok(());
    }

    Output::header(&format!("Indexed Videos ({})", videos.len()));
    println!();
    for video in &videos {
        Output::video_info(video);
    }

    let total_chunks: usize = videos.iter().map(|v| v.chunk_count).sum();
    println!();
    Output::kv("Total videos", &videos.len().to_string());
    Output::kv("Total chunks", &total_chunks.to_string());

    Ok(())
}
