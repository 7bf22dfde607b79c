//! In-memory fakes for the external services, shared by unit tests.

use crate::embedding::Embedder;
use crate::error::{CourseBotError, Result};
use crate::history::History;
use crate::rag::{ContextDocument, GenerativeService};
use async_trait::async_trait;
use std::sync::Mutex;

/// Embeds every text as the same vector.
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Embedder whose every call fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(CourseBotError::Embedding("embedding service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(CourseBotError::Embedding("embedding service unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// What a [`ScriptedGenerator`] was asked.
#[derive(Debug, Clone)]
pub struct GeneratorCall {
    pub question: String,
    pub history_len: usize,
    pub context_titles: Vec<String>,
}

/// Returns a fixed answer and records each call.
pub struct ScriptedGenerator {
    answer: String,
    calls: Mutex<Vec<GeneratorCall>>,
}

impl ScriptedGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeService for ScriptedGenerator {
    async fn condense(&self, message: &str, _history: &History) -> Result<String> {
        Ok(format!("standalone: {}", message))
    }

    async fn answer(&self, message: &str, history: &History, context: &[ContextDocument]) -> Result<String> {
        self.calls.lock().unwrap().push(GeneratorCall {
            question: message.to_string(),
            history_len: history.len(),
            context_titles: context.iter().map(|d| d.title.clone()).collect(),
        });
        Ok(self.answer.clone())
    }
}

/// Generator whose every call fails.
pub struct FailingGenerator;

#[async_trait]
impl GenerativeService for FailingGenerator {
    async fn answer(&self, _message: &str, _history: &History, _context: &[ContextDocument]) -> Result<String> {
        Err(CourseBotError::Generation("model unavailable".to_string()))
    }
}
