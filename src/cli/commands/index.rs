//! Index command implementation.

use super::run_preflight;
use crate::catalog::Catalog;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::orchestrator::IndexBuilder;
use anyhow::Result;
use std::sync::Arc;

/// Run the index command.
pub async fn run_index(courses: Option<String>, mut settings: Settings) -> Result<()> {
    if let Some(path) = courses {
        settings.catalog.courses_path = path;
    }
    run_preflight(Operation::Index, &settings)?;

    let catalog = Catalog::load(&settings.courses_path())?;
    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let builder = IndexBuilder::new(embedder);

    let spinner = Output::spinner(&format!("Embedding {} courses...", catalog.len()));
    let result = builder
        .build(&catalog, &settings.index_path(), &settings.metadata_path())
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            Output::success(&format!("Indexed {} courses", result.courses));
            Output::kv("Model", &result.info.model);
            Output::kv("Dimensions", &result.info.dimensions.to_string());
            Output::kv("Index", &settings.index_path().display().to_string());
            Output::kv("Metadata", &settings.metadata_path().display().to_string());
        }
        Err(e) => {
            Output::error(&format!("Indexing failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
