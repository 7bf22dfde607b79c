//! Search command implementation.

use super::run_preflight;
use crate::answer::NOT_AVAILABLE;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, k: Option<usize>, settings: Settings) -> Result<()> {
    run_preflight(Operation::Search, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.search(query, k).await;
    spinner.finish_and_clear();

    match results {
        Ok(matches) => {
            if matches.is_empty() {
                Output::warning("No courses found.");
            } else {
                Output::success(&format!("Found {} courses", matches.len()));

                for m in &matches {
                    let course = m.course.as_ref();
                    Output::course_result(
                        m.rank,
                        course.and_then(|c| c.name.as_deref()).unwrap_or(NOT_AVAILABLE),
                        m.distance,
                        course.and_then(|c| c.description.as_deref()).unwrap_or(NOT_AVAILABLE),
                        course.and_then(|c| c.link.as_deref()),
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
