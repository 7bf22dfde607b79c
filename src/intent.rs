//! Message intent classification.
//!
//! The router only sees an [`Intent`]; how a message is classified lives
//! behind [`IntentClassifier`] so the keyword rules can be swapped out.

use std::collections::HashMap;

/// Canned identity questions and their fixed answers.
///
/// Questions are stored normalized: lower case, no trailing question mark.
pub const CANNED_ANSWERS: &[(&str, &str)] = &[
    (
        "who are you",
        "I am a course chatbot. I can help you with information about our courses.",
    ),
    ("what is your name", "I am your friendly course chatbot!"),
];

/// Substrings that mark a message as a course lookup.
pub const LOOKUP_KEYWORDS: &[&str] = &[
    "course",
    "courses",
    "programme",
    "program",
    "session",
    "class",
    "classes",
    "training",
    "education",
    "learn",
    "learn more",
    "know more",
    "find out",
    "explore",
    "information",
];

/// How a message should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Answer with this fixed text.
    Canned(String),
    /// Look courses up in the catalog.
    Lookup,
    /// Hand over to the conversational fallback.
    Open,
}

/// Classifies a user message.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, message: &str) -> Intent;
}

/// Rule-based classifier: exact canned questions, then lookup keywords.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    canned: HashMap<String, String>,
    keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            canned: CANNED_ANSWERS
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
            keywords: LOOKUP_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a canned question.
    pub fn with_canned(mut self, question: &str, answer: &str) -> Self {
        self.canned.insert(normalize(question), answer.to_string());
        self
    }

    /// Add a lookup keyword.
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keywords.push(keyword.trim().to_lowercase());
        self
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, message: &str) -> Intent {
        if let Some(answer) = self.canned.get(&normalize(message)) {
            return Intent::Canned(answer.clone());
        }

        let lowered = message.to_lowercase();
        if self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            Intent::Lookup
        } else {
            Intent::Open
        }
    }
}

/// Lower-case, trim, and drop one optional trailing question mark.
fn normalize(message: &str) -> String {
    let lowered = message.trim().to_lowercase();
    lowered
        .strip_suffix('?')
        .map(|s| s.trim_end().to_string())
        .unwrap_or(lowered)
}
