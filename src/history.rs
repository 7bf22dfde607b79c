//! Conversation history passed between client and engine.
//!
//! The engine keeps no session state. Each exchange takes the history by
//! value and returns it one turn longer.

use serde::{Deserialize, Serialize};

/// One user message and the answer given to it.
///
/// Serialized as a two-element array `[user, assistant]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

impl From<(String, String)> for Turn {
    fn from((user, assistant): (String, String)) -> Self {
        Self { user, assistant }
    }
}

impl From<Turn> for (String, String) {
    fn from(turn: Turn) -> Self {
        (turn.user, turn.assistant)
    }
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Turn>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.0.push(Turn::new(user, assistant));
    }

    /// Consume the history and return it with one more turn.
    pub fn with_turn(mut self, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        self.push(user, assistant);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    /// Render as `Human:`/`Assistant:` lines for prompt templates.
    pub fn transcript(&self) -> String {
        self.0
            .iter()
            .map(|t| format!("Human: {}\nAssistant: {}", t.user, t.assistant))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_list_of_pairs() {
        let history = History::new().with_turn("hi", "hello!").with_turn("bye", "see you");

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json, serde_json::json!([["hi", "hello!"], ["bye", "see you"]]));

        let parsed: History = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, history);
    }

    #[test]
    fn test_rejects_malformed_turns() {
        assert!(serde_json::from_str::<History>(r#"[["only one"]]"#).is_err());
        assert!(serde_json::from_str::<History>(r#"[{"user": "a"}]"#).is_err());
    }

    #[test]
    fn test_transcript() {
        let history = History::new().with_turn("Do you teach Java?", "Yes.");
        assert_eq!(history.transcript(), "Human: Do you teach Java?\nAssistant: Yes.");
        assert_eq!(History::new().transcript(), "");
    }
}
