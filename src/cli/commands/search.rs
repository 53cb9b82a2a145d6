//! Search command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, top_k: Option<usize>, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Search)?;

    let spinner = Output::spinner("Searching...");
    let hits = orchestrator.relevant_sources(query, top_k).await;
    spinner.finish_and_clear();

    if hits.is_empty() {
        Output::info("No matching passages found.");
        return Ok(());
    }

    Output::header(&format!("Results for \"{}\"", query));
    for (i, hit) in hits.iter().enumerate() {
        Output::source(i + 1, hit);
    }
    println!();

    Ok(())
}
