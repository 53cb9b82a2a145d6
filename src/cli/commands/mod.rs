//! CLI command implementations.

mod add;
mod ask;
mod chat;
mod clear;
mod config;
mod doctor;
mod list;
mod remove;
mod search;
mod serve;
mod stats;

pub use add::run_add;
pub use ask::run_ask;
pub use chat::run_chat;
pub use clear::run_clear;
pub use config::run_config;
pub use doctor::run_doctor;
pub use list::run_list;
pub use remove::run_remove;
pub use search::run_search;
pub use serve::run_serve;
pub use stats::run_stats;

use crate::cli::Output;
use crate::config::{GeneratorKind, Settings};
use crate::orchestrator::Orchestrator;
use crate::probe::{Capabilities, Operation};
use tracing::debug;

/// Check the environment for `operation` and build an orchestrator.
///
/// Without an API key the language model generator is replaced by the
/// rule-based one.
pub(crate) fn open_orchestrator(
    mut settings: Settings,
    operation: Operation,
) -> anyhow::Result<Orchestrator> {
    let caps = Capabilities::detect();

    if let Err(e) = caps.check(&settings, operation) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if settings.rag.generator == GeneratorKind::Llm && !caps.llm_answers(&settings) {
        debug!("No API key configured, answers use the fallback generator");
        settings.rag.generator = GeneratorKind::Fallback;
    }

    Ok(Orchestrator::new(settings)?)
}
