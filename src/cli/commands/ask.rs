//! Ask command implementation.

use super::run_preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::history::History;
use crate::orchestrator::Orchestrator;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the ask command.
///
/// With `--history`, the file is read as `[[question, answer], ...]` and
/// rewritten with this exchange appended, so a conversation can span calls.
pub async fn run_ask(message: &str, history_file: Option<String>, settings: Settings) -> Result<()> {
    run_preflight(Operation::Respond, &settings)?;

    let history_path = history_file.map(|p| Settings::expand_path(&p));
    let history = match &history_path {
        Some(path) => read_history(path)?,
        None => History::new(),
    };

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Thinking...");
    let result = orchestrator.respond(message, history).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            println!("\n{}\n", reply.answer);

            if let Some(path) = &history_path {
                write_history(path, &reply.history)?;
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn read_history(path: &Path) -> Result<History> {
    if !path.exists() {
        return Ok(History::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(History::new());
    }
    serde_json::from_str(&content).with_context(|| format!("Invalid history file {}", path.display()))
}

fn write_history(path: &Path, history: &History) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(history)?)?;
    Ok(())
}
