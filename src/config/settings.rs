//! Configuration settings for coursebot.

use crate::error::{CourseBotError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub catalog: CatalogSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub answer: AnswerSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error) used when no `-v` is given.
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.coursebot".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Locations of the catalog source and the persisted index artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Scraped catalog file consumed by `coursebot index`.
    pub courses_path: String,
    /// Metadata store written by the index builder and loaded at start.
    pub metadata_path: String,
    /// Vector index file written by the index builder and loaded at start.
    pub index_path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            courses_path: "courses.json".to_string(),
            metadata_path: "~/.coursebot/courses_metadata.json".to_string(),
            index_path: "~/.coursebot/courses_index.db".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Base URL of an OpenAI-compatible API (official endpoint if unset).
    pub api_base: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            api_base: None,
        }
    }
}

/// Course lookup ranking policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Neighbors fetched from the index before filtering.
    pub top_k: usize,
    /// Maximum squared-L2 distance for a course to count as relevant.
    pub distance_threshold: f32,
    /// Maximum number of courses shown in a lookup answer.
    pub max_results: usize,
    /// Default `k` for plain similarity search.
    pub search_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            distance_threshold: 1.0,
            max_results: 5,
            search_k: 5,
        }
    }
}

/// Generative fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// LLM model for conversational answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Course documents retrieved as context for each answer.
    pub context_documents: usize,
    /// Transport timeout for model calls, in seconds.
    pub timeout_secs: u64,
    /// Base URL of an OpenAI-compatible API (official endpoint if unset).
    pub api_base: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            context_documents: 4,
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
            api_base: None,
        }
    }
}

/// Rendering style for course lookup answers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStyle {
    /// Plain text with markdown emphasis.
    #[default]
    Markdown,
    /// Course cards as HTML fragments.
    Html,
}

/// Course lookup answer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// Output style.
    pub style: AnswerStyle,
    /// "Book a Free Demo" call-to-action link.
    pub book_demo_url: String,
    /// "Enquire Now" call-to-action link.
    pub contact_url: String,
    /// Append the raw search distance to every course.
    pub show_distance: bool,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            style: AnswerStyle::Markdown,
            book_demo_url: "https://brainlox.com/book-free-demo".to_string(),
            contact_url: "https://brainlox.com/contact".to_string(),
            show_distance: false,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would otherwise only fail deep inside a request.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.max_results == 0 || self.retrieval.top_k == 0 {
            return Err(CourseBotError::Config(
                "retrieval.top_k and retrieval.max_results must be at least 1".to_string(),
            ));
        }
        if !self.retrieval.distance_threshold.is_finite() || self.retrieval.distance_threshold < 0.0 {
            return Err(CourseBotError::Config(format!(
                "retrieval.distance_threshold must be a non-negative number, got {}",
                self.retrieval.distance_threshold
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(CourseBotError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }

        for (key, value) in [
            ("answer.book_demo_url", &self.answer.book_demo_url),
            ("answer.contact_url", &self.answer.contact_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| CourseBotError::Config(format!("{} is not a valid URL ({}): {}", key, value, e)))?;
        }

        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| CourseBotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Log level for a `-v` count; zero falls back to `general.log_level`.
    pub fn log_level(&self, verbose: u8) -> &str {
        match verbose {
            0 => &self.general.log_level,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursebot")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded catalog source path.
    pub fn courses_path(&self) -> PathBuf {
        Self::expand_path(&self.catalog.courses_path)
    }

    /// Get the expanded metadata store path.
    pub fn metadata_path(&self) -> PathBuf {
        Self::expand_path(&self.catalog.metadata_path)
    }

    /// Get the expanded vector index path.
    pub fn index_path(&self) -> PathBuf {
        Self::expand_path(&self.catalog.index_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.retrieval.top_k, 10);
        assert_eq!(settings.retrieval.max_results, 5);
        assert!((settings.retrieval.distance_threshold - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            max_results = 3

            [answer]
            style = "html"
            "#,
        )
        .unwrap();

        assert_eq!(settings.retrieval.max_results, 3);
        assert_eq!(settings.retrieval.top_k, 10);
        assert_eq!(settings.answer.style, AnswerStyle::Html);
        assert_eq!(settings.generation.context_documents, 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.retrieval.max_results = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.answer.contact_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.retrieval.distance_threshold = -0.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 8080;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8080);
    }

    #[test]
    fn test_log_level() {
        let mut settings = Settings::default();
        assert_eq!(settings.log_level(0), "warn");

        settings.general.log_level = "debug".to_string();
        assert_eq!(settings.log_level(0), "debug");
        assert_eq!(settings.log_level(1), "info");
        assert_eq!(settings.log_level(3), "trace");
    }
}
