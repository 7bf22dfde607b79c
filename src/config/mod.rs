//! Configuration module for coursebot.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    AnswerSettings, AnswerStyle, CatalogSettings, EmbeddingSettings, GeneralSettings,
    GenerationSettings, PromptSettings, RetrievalSettings, ServerSettings, Settings,
};
