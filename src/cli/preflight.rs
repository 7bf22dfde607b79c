//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials and input files are available before
//! starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{CourseBotError, Result};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chatting needs both model services and the persisted index.
    Respond,
    /// Search needs the embedding service and the persisted index.
    Search,
    /// Indexing needs the embedding service and the scraped catalog.
    Index,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Respond => {
            check_credentials(settings.embedding.api_base.as_deref())?;
            check_credentials(settings.generation.api_base.as_deref())?;
            check_index_files(settings)?;
        }
        Operation::Search => {
            check_credentials(settings.embedding.api_base.as_deref())?;
            check_index_files(settings)?;
        }
        Operation::Index => {
            check_credentials(settings.embedding.api_base.as_deref())?;
            check_file(&settings.courses_path(), "Course catalog")?;
        }
    }
    Ok(())
}

/// A custom API base may be a local server that needs no key.
fn check_credentials(api_base: Option<&str>) -> Result<()> {
    if api_base.is_some() {
        return Ok(());
    }
    check_api_key()
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(CourseBotError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(CourseBotError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

fn check_index_files(settings: &Settings) -> Result<()> {
    check_file(&settings.index_path(), "Vector index")?;
    check_file(&settings.metadata_path(), "Course metadata")
}

fn check_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CourseBotError::Config(format!(
            "{} not found at {}. Run 'coursebot index' first.",
            what,
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_settings(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.embedding.api_base = Some("http://localhost:11434/v1".to_string());
        settings.generation.api_base = Some("http://localhost:11434/v1".to_string());
        settings.catalog.courses_path = dir.join("courses.json").display().to_string();
        settings.catalog.metadata_path = dir.join("courses_metadata.json").display().to_string();
        settings.catalog.index_path = dir.join("courses_index.db").display().to_string();
        settings
    }

    #[test]
    fn test_missing_index_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = local_settings(dir.path());

        let err = check(Operation::Search, &settings).unwrap_err();
        assert!(err.to_string().contains("coursebot index"));
    }

    #[test]
    fn test_local_server_needs_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = local_settings(dir.path());
        std::fs::write(settings.index_path(), b"").unwrap();
        std::fs::write(settings.metadata_path(), b"[]").unwrap();

        assert!(check(Operation::Respond, &settings).is_ok());
        assert!(check(Operation::Index, &settings).is_err());

        std::fs::write(settings.courses_path(), b"[]").unwrap();
        assert!(check(Operation::Index, &settings).is_ok());
    }
}
