//! Ask command implementation.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::probe::Operation;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    top_k: Option<usize>,
    show_sources: bool,
    settings: Settings,
) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Ask)?;

    let spinner = Output::spinner("Searching knowledge base...");
    let answer = orchestrator.ask_question(question, top_k).await;
    spinner.finish_and_clear();

    println!("\n{}\n", answer);

    if show_sources {
        let sources = orchestrator.relevant_sources(question, top_k).await;
        if !sources.is_empty() {
            Output::header("Sources");
            for (i, hit) in sources.iter().enumerate() {
                Output::source(i + 1, hit);
            }
            println!();
        }
    }

    Ok(())
}
