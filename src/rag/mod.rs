//! RAG (Retrieval-Augmented Generation) fallback for open questions.
//!
//! Messages that are neither canned nor course lookups are answered by a
//! generative model, conditioned on the conversation so far and on the
//! course documents closest to the question.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::OpenAIGenerator;

use crate::catalog::CourseId;
use crate::error::Result;
use crate::history::History;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Answer used whenever generation fails or produces nothing.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't generate an answer at this time.";

/// A course document supplied to the model as context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDocument {
    pub course_id: CourseId,
    /// Course name, for citations.
    pub title: String,
    /// Full document text.
    pub content: String,
    pub distance: f32,
}

/// Generative language model behind the fallback.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Rewrite a follow-up message into a standalone question.
    ///
    /// Only called when there is history. The default keeps the message as is.
    async fn condense(&self, message: &str, _history: &History) -> Result<String> {
        Ok(message.to_string())
    }

    /// Produce an answer from the history, the new message and retrieved context.
    async fn answer(&self, message: &str, history: &History, context: &[ContextDocument]) -> Result<String>;
}

/// Conversational fallback that never fails.
pub struct Fallback {
    service: Arc<dyn GenerativeService>,
    context_builder: ContextBuilder,
}

impl Fallback {
    pub fn new(service: Arc<dyn GenerativeService>, context_builder: ContextBuilder) -> Self {
        Self {
            service,
            context_builder,
        }
    }

    /// Answer an open message, degrading to [`FALLBACK_ANSWER`] on any failure.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn generate(&self, message: &str, history: &History) -> String {
        match self.try_generate(message, history).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => {
                warn!("Generative service returned an empty answer");
                FALLBACK_ANSWER.to_string()
            }
            Err(e) => {
                warn!("Generative fallback failed: {}", e);
                FALLBACK_ANSWER.to_string()
            }
        }
    }

    async fn try_generate(&self, message: &str, history: &History) -> Result<String> {
        let question = self.standalone_question(message, history).await;
        let context = self.context_builder.build(&question).await?;
        debug!("Generating answer with {} context documents", context.len());

        self.service.answer(&question, history, &context).await
    }

    async fn standalone_question(&self, message: &str, history: &History) -> String {
        if history.is_empty() {
            return message.to_string();
        }

        match self.service.condense(message, history).await {
            Ok(question) if !question.trim().is_empty() => {
                debug!("Condensed follow-up into: {}", question.trim());
                question.trim().to_string()
            }
            Ok(_) => message.to_string(),
            Err(e) => {
                warn!("Failed to condense follow-up, using it as is: {}", e);
                message.to_string()
            }
        }
    }
}
