//! OpenAI-compatible chat-completion backend
//!
//! Works with any server exposing `POST {base_url}/chat/completions`:
//! - OpenAI
//! - Groq
//! - vLLM and other local OpenAI-compatible servers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use sales_agent_config::ProviderConfig;
use sales_agent_core::{ChatMessage, ChatProvider, ChatRole, Completion, CompletionOptions, TokenUsage};

use crate::LlmError;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    /// Retry attempts for transient failures
    pub max_retries: u32,
    /// Doubles after each retry
    pub initial_backoff: Duration,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    /// Build from settings. Returns `None` when no API key can be resolved.
    pub fn from_provider(provider: &ProviderConfig, max_retries: u32) -> Option<Self> {
        let api_key = provider.resolved_api_key()?;
        Some(
            Self::new(&provider.name, &provider.base_url, &provider.model)
                .with_api_key(api_key)
                .with_timeout(Duration::from_secs(provider.timeout_secs))
                .with_retries(max_retries, Duration::from_millis(100)),
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

pub struct OpenAiCompatibleBackend {
    config: BackendConfig,
    client: Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() && !config.base_url.starts_with("http://localhost")
            && !config.base_url.starts_with("http://127.0.0.1")
        {
            return Err(LlmError::Configuration(format!(
                "API key required for provider {}",
                config.name
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn execute_request(&self, request: &ChatRequest<'_>) -> Result<Completion, LlmError> {
        let mut builder = self.client.post(self.chat_url()).json(request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))?;

        Ok(Completion {
            text,
            usage: body.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }

    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: role_name(m.role),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    provider = %self.config.name,
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&request).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> sales_agent_core::Result<Completion> {
        Ok(self.generate(messages, options).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_endpoint_requires_key() {
        let config = BackendConfig::new("openai", "https://api.openai.com/v1", "gpt-4o-mini");
        assert!(matches!(
            OpenAiCompatibleBackend::new(config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let config = BackendConfig::new("local", "http://localhost:8000/v1/", "llama");
        let backend = OpenAiCompatibleBackend::new(config).unwrap();
        assert_eq!(backend.chat_url(), "http://localhost:8000/v1/chat/completions");
        assert_eq!(backend.name(), "local");
    }

    #[test]
    fn test_from_provider_without_key_is_none() {
        let provider = ProviderConfig::new("nokey-provider", "https://example.com", "m");
        assert!(BackendConfig::from_provider(&provider, 2).is_none());
    }
}
