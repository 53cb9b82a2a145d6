use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;

/// Run the remove command.
pub async fn run_remove(video_id: &str, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Search)?;

    if orchestrator.remove_video(video_id).await {
        Output::success(&format!("Removed {}", video_id));
        Ok(())
    } else {
        Output::error(&format!("Failed to remove {}", video_id));
        anyhow::bail!("Failed to remove video {}", video_id)
    }
}
