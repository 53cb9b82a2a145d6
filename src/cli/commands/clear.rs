//! Clear command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Run the clear command, asking for confirmation unless `yes` is set.
pub async fn run_clear(yes: bool, settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Search)?;

    if !yes && !confirm("Remove every video from the knowledge base? [y/N] ")? {
        Output::info("Aborted.");
        return Ok(());
    }

    if orchestrator.clear_knowledge_base().await {
        Output::success("Knowledge base cleared.");
        Ok(())
    } else {
        Output::error("Failed to clear the knowledge base.");
        anyhow::bail!("Failed to clear the knowledge base")
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
