//! Conversation router: the entry point for every chat message.
//!
//! Each message is classified, answered by exactly one path (canned text,
//! course lookup, or the generative fallback), and appended to the history
//! the caller passed in. Downstream failures never escape: they turn into a
//! fixed apology that is still recorded as the turn's answer.

use crate::answer::AnswerFormatter;
use crate::error::{CourseBotError, Result};
use crate::history::History;
use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
use crate::rag::{Fallback, FALLBACK_ANSWER};
use crate::retrieval::Retriever;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Canned,
    Lookup,
    Open,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Canned => write!(f, "canned"),
            Route::Lookup => write!(f, "lookup"),
            Route::Open => write!(f, "open"),
        }
    }
}

/// Result of one exchange.
#[derive(Debug, Clone)]
pub struct Reply {
    pub answer: String,
    /// The caller's history plus this exchange.
    pub history: History,
    pub route: Route,
}

/// Routes messages to the right answering strategy.
pub struct ConversationRouter {
    classifier: Box<dyn IntentClassifier>,
    retriever: Arc<Retriever>,
    formatter: AnswerFormatter,
    fallback: Fallback,
}

impl ConversationRouter {
    /// Create a router using the keyword classifier.
    pub fn new(retriever: Arc<Retriever>, formatter: AnswerFormatter, fallback: Fallback) -> Self {
        Self {
            classifier: Box::new(KeywordClassifier::default()),
            retriever,
            formatter,
            fallback,
        }
    }

    /// Replace the intent classifier.
    pub fn with_classifier(mut self, classifier: impl IntentClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Answer a message and return the updated history.
    ///
    /// Fails only for an empty message, in which case history is untouched.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn respond(&self, message: &str, history: History) -> Result<Reply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CourseBotError::InvalidInput("Message must not be empty".to_string()));
        }

        let started = Instant::now();
        let (route, answer) = match self.classifier.classify(message) {
            Intent::Canned(answer) => (Route::Canned, answer),
            Intent::Lookup => (Route::Lookup, self.lookup(message).await),
            Intent::Open => (Route::Open, self.fallback.generate(message, &history).await),
        };

        info!(
            route = %route,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered message"
        );

        Ok(Reply {
            history: history.with_turn(message, answer.clone()),
            answer,
            route,
        })
    }

    async fn lookup(&self, message: &str) -> String {
        match self.retriever.rank(message).await {
            Ok(results) => self.formatter.format(message, &results),
            Err(e) => {
                warn!("Course lookup failed: {}", e);
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}
