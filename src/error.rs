//! Error types for coursebot.

use thiserror::Error;

/// Library-level error type for coursebot operations.
#[derive(Error, Debug)]
pub enum CourseBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl CourseBotError {
    /// Whether this error was caused by the caller's input rather than the system.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CourseBotError::InvalidInput(_))
    }
}

/// Result type alias for coursebot operations.
pub type Result<T> = std::result::Result<T, CourseBotError>;
