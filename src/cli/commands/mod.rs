//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod index;
mod search;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use index::run_index;
pub use search::run_search;
pub use serve::run_serve;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;

/// Run pre-flight checks, reporting a failure the way every command does.
fn run_preflight(operation: Operation, settings: &Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation, settings) {
        Output::error(&format!("{}", e));
        Output::info("Check 'coursebot config show' for the paths in use.");
        return Err(e.into());
    }
    Ok(())
}
