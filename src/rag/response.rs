//! RAG response generation over the OpenAI chat API.

use super::{context::format_context_for_prompt, ContextDocument, GenerativeService};
use crate::config::{GenerationSettings, Prompts};
use crate::error::{CourseBotError, Result};
use crate::history::History;
use crate::openai::create_client_with;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat-completion backed generative service.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl OpenAIGenerator {
    /// Create a generator from configuration.
    pub fn from_settings(settings: &GenerationSettings, prompts: Prompts) -> Result<Self> {
        let client = create_client_with(
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts,
        })
    }

    /// Build the message list for an answer: system prompt, prior turns, prompt.
    fn answer_messages(
        &self,
        message: &str,
        history: &History,
        context: &[ContextDocument],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), message.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(context));
        let user_prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);
        let system_prompt = self.prompts.render_with_custom(&self.prompts.rag.system, &HashMap::new());

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| CourseBotError::Generation(e.to_string()))?
                .into(),
        ];

        for turn in history.turns() {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.user.clone())
                    .build()
                    .map_err(|e| CourseBotError::Generation(e.to_string()))?
                    .into(),
            );
            messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.assistant.clone())
                    .build()
                    .map_err(|e| CourseBotError::Generation(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| CourseBotError::Generation(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>, temperature: f32) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(|e| CourseBotError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CourseBotError::OpenAI(format!("Failed to generate response: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| CourseBotError::Generation("Empty response from LLM".to_string()))
    }
}

#[async_trait]
impl GenerativeService for OpenAIGenerator {
    #[instrument(skip(self, history), fields(turns = history.len()))]
    async fn condense(&self, message: &str, history: &History) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), message.to_string());
        vars.insert("history".to_string(), history.transcript());
        let prompt = self.prompts.render_with_custom(&self.prompts.rag.condense, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| CourseBotError::Generation(e.to_string()))?
            .into()];

        self.complete(messages, 0.0).await
    }

    #[instrument(skip(self, history, context), fields(turns = history.len(), documents = context.len()))]
    async fn answer(&self, message: &str, history: &History, context: &[ContextDocument]) -> Result<String> {
        let messages = self.answer_messages(message, history, context)?;
        debug!("Sending {} messages to {}", messages.len(), self.model);

        self.complete(messages, self.temperature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_messages_include_history_and_context() {
        let generator = OpenAIGenerator::from_settings(&GenerationSettings::default(), Prompts::default()).unwrap();

        let history = History::new()
            .with_turn("hi", "hello")
            .with_turn("do you teach kids?", "yes");
        let context = vec![ContextDocument {
            course_id: 0,
            title: "Scratch".to_string(),
            content: "Course Name: Scratch".to_string(),
            distance: 0.3,
        }];

        let messages = generator.answer_messages("which one?", &history, &context).unwrap();
        // system + 2 turns * 2 + final prompt
        assert_eq!(messages.len(), 6);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[5], ChatCompletionRequestMessage::User(_)));
    }
}
