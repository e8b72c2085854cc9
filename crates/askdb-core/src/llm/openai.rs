//! OpenAI chat-completions provider.

use super::{CompletionRequest, CompletionResponse, LlmProvider, Role, TokenUsage};
use crate::config::LlmConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
    /// Creates a provider for `model` against the public OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let defaults = LlmConfig::default();
        Self::build(
            api_key.into(),
            model.into(),
            defaults.base_url,
            defaults.timeout_secs,
        )
    }

    /// Creates a provider from config; `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        Self::build(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            config.timeout_secs,
        )
        .map(Some)
    }

    /// Points the provider at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build(api_key: String, model: String, base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url,
            timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn chat_body<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = &request.system_prompt {
        messages.push(ChatMessage {
            role: Role::System,
            content: system,
        });
    }
    messages.extend(request.messages.iter().map(|m| ChatMessage {
        role: m.role,
        content: &m.content,
    }));
    ChatRequest {
        model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

fn into_completion(response: ChatResponse) -> Result<CompletionResponse> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::llm("response contained no choices"))?;
    let tokens_used = response
        .usage
        .map(|u| TokenUsage {
            input: u.prompt_tokens,
            output: u.completion_tokens,
        })
        .unwrap_or_default();
    Ok(CompletionResponse {
        content,
        tokens_used,
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        tracing::debug!(model = %self.model, messages = request.messages.len(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&chat_body(&self.model, &request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    Error::llm_with_source("request to language model failed", e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(Error::llm(format!("status {status}: {body}")));
            }
            return Err(Error::LlmRejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::llm_with_source("malformed completion response", e))?;
        into_completion(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llm::Message;

    #[test]
    fn test_chat_body_puts_system_prompt_first() {
        let request = CompletionRequest::new(vec![Message::user("How many users?")])
            .with_system_prompt("Translate to SQL")
            .with_max_tokens(100);
        let body = serde_json::to_value(chat_body("gpt-4o-mini", &request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 100);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Translate to SQL");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "How many users?");
    }

    #[test]
    fn test_into_completion_reads_first_choice_and_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "SELECT 1;"}}],
            "usage": {"prompt_tokens": 40, "completion_tokens": 5, "total_tokens": 45}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(parsed).unwrap();
        assert_eq!(completion.content, "SELECT 1;");
        assert_eq!(completion.tokens_used.total(), 45);
    }

    #[test]
    fn test_into_completion_without_choices_is_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(into_completion(parsed).is_err());
    }

    #[test]
    fn test_from_config_without_key_is_none() {
        assert!(
            OpenAiProvider::from_config(&LlmConfig::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAiProvider::new("sk-test", "gpt-4o-mini")
            .unwrap()
            .with_base_url("http://localhost:11434/v1/");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(provider.model(), "gpt-4o-mini");
    }
}
