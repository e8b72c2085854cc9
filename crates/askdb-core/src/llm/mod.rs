//! Language-model access.
//!
//! [`LlmProvider`] is the seam between SQL generation and whatever model
//! answers the prompt. [`OpenAiProvider`] speaks the chat-completions
//! protocol, [`RetryWrapper`] adds backoff for transient failures, and
//! [`MockLlmProvider`] returns scripted answers for tests.

mod mock;
mod openai;
mod retry;

pub use mock::MockLlmProvider;
pub use openai::OpenAiProvider;
pub use retry::RetryWrapper;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// The asking side.
    User,
    /// The model's earlier replies.
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation so far.
    pub messages: Vec<Message>,
    /// System prompt sent ahead of the messages.
    pub system_prompt: Option<String>,
    /// Completion token limit.
    pub max_tokens: u32,
    /// Sampling temperature; 0 for deterministic output.
    pub temperature: f32,
}

impl CompletionRequest {
    /// Creates a request with default limits.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_prompt: None,
            max_tokens: 256,
            temperature: 0.0,
        }
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the completion token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input: u32,
    /// Completion tokens.
    pub output: u32,
}

impl TokenUsage {
    /// Prompt plus completion tokens.
    pub fn total(&self) -> u32 {
        self.input.saturating_add(self.output)
    }
}

/// A completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated text.
    pub content: String,
    /// Tokens consumed.
    pub tokens_used: TokenUsage,
}

/// Something that can complete a chat prompt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete the request.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "llm"
    }
}
