use async_trait::async_trait;
use quill_common::Result;
use serde::{Deserialize, Serialize};

/// Speaker of a chat turn. The system prompt travels out-of-band, so only
/// the two conversational roles exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send an ordered list of role-tagged turns plus an optional system
    /// prompt; the provider answers with a single text turn.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        max_tokens: u32,
    ) -> Result<LlmResponse>;

    /// Convenience wrapper for single-prompt calls.
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        max_tokens: u32,
    ) -> Result<LlmResponse> {
        let messages = [ChatMessage::user(prompt)];
        self.chat(&messages, system, max_tokens).await
    }

    /// Check if the LLM service is available.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
