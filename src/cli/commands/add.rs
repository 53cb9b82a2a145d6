//! Add command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;

/// Run the add command.
pub async fn run_add(urls: &[String], force_refresh: bool, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Index)?;

    let spinner = Output::spinner(&format!("Adding {} video(s)...", urls.len()));
    let report = orchestrator.add_videos(urls, force_refresh).await;
    spinner.finish_and_clear();

    for (url, ok) in &report.results {
        if *ok {
            Output::success(&format!("Added {}", url));
        } else {
            Output::error(&format!("Failed to add {}", url));
        }
    }

    println!();
    Output::kv("Succeeded", &report.succeeded.to_string());
    Output::kv("Failed", &report.failed.to_string());

    if report.failed > 0 && report.succeeded == 0 {
        anyhow::bail!("No videos were added");
    }
    Ok(())
}
