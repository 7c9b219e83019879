//! Priority-ordered chat-completion routing
//!
//! Providers are tried in configuration order. Providers with an open
//! circuit are skipped; failures are recorded against the breaker and never
//! surfaced to the caller. When nothing answers, a static apology tagged
//! with the `mock` identity is returned.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;

use sales_agent_config::constants::llm::{FALLBACK_PROVIDER, FALLBACK_TEXT};
use sales_agent_config::LlmConfig;
use sales_agent_core::{ChatMessage, ChatProvider, CompletionOptions, TokenUsage};

use crate::circuit_breaker::{CircuitBreaker, CircuitState};

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub failure_threshold: u32,
    pub open_duration: Duration,
    /// Upper bound for one provider call, retries included
    pub request_timeout: Duration,
    pub default_options: CompletionOptions,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_duration: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            default_options: CompletionOptions::default(),
        }
    }
}

impl From<&LlmConfig> for RouterConfig {
    fn from(config: &LlmConfig) -> Self {
        let request_timeout = config
            .providers
            .iter()
            .map(|p| p.timeout_secs)
            .max()
            .unwrap_or(30);
        Self {
            failure_threshold: config.failure_threshold,
            open_duration: Duration::from_secs(config.open_duration_secs),
            request_timeout: Duration::from_secs(request_timeout),
            default_options: CompletionOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        }
    }
}

/// Text plus the identity of whoever produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedCompletion {
    pub text: String,
    pub provider: String,
    pub usage: Option<TokenUsage>,
}

impl RoutedCompletion {
    pub fn is_fallback(&self) -> bool {
        self.provider == FALLBACK_PROVIDER
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub state: CircuitState,
    pub failures: u32,
}

struct RoutedProvider {
    provider: Arc<dyn ChatProvider>,
    breaker: CircuitBreaker,
}

pub struct CallRouter {
    providers: Vec<RoutedProvider>,
    config: RouterConfig,
}

impl CallRouter {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>, config: RouterConfig) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| RoutedProvider {
                provider,
                breaker: CircuitBreaker::new(config.failure_threshold, config.open_duration),
            })
            .collect();
        Self { providers, config }
    }

    pub fn default_options(&self) -> CompletionOptions {
        self.config.default_options
    }

    /// True when at least one provider would currently be tried
    pub fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.breaker.is_callable())
    }

    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| ProviderStatus {
                name: p.provider.name().to_string(),
                state: p.breaker.state(),
                failures: p.breaker.failures(),
            })
            .collect()
    }

    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> RoutedCompletion {
        for entry in &self.providers {
            let name = entry.provider.name();

            if !entry.breaker.allow_request() {
                tracing::debug!(provider = name, "Circuit open, skipping provider");
                continue;
            }

            let outcome = tokio::time::timeout(
                self.config.request_timeout,
                entry.provider.complete(messages, options),
            )
            .await;

            let error = match outcome {
                Ok(Ok(completion)) => {
                    entry.breaker.record_success();
                    counter!("sales_agent_llm_requests_total", "provider" => name.to_string(), "outcome" => "success")
                        .increment(1);
                    return RoutedCompletion {
                        text: completion.text,
                        provider: name.to_string(),
                        usage: completion.usage,
                    };
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {:?}", self.config.request_timeout),
            };

            counter!("sales_agent_llm_requests_total", "provider" => name.to_string(), "outcome" => "failure")
                .increment(1);
            let opened = entry.breaker.record_failure();
            tracing::warn!(
                provider = name,
                failures = entry.breaker.failures(),
                error = %error,
                "Provider failed, trying next"
            );
            if opened {
                counter!("sales_agent_circuit_opened_total", "provider" => name.to_string())
                    .increment(1);
                tracing::warn!(
                    provider = name,
                    open_for = ?self.config.open_duration,
                    "Circuit opened"
                );
            }
        }

        tracing::error!(
            providers = self.providers.len(),
            "All chat providers unavailable, using fallback reply"
        );
        RoutedCompletion {
            text: FALLBACK_TEXT.to_string(),
            provider: FALLBACK_PROVIDER.to_string(),
            usage: None,
        }
    }

    pub async fn complete_default(&self, messages: &[ChatMessage]) -> RoutedCompletion {
        let options = self.config.default_options;
        self.complete(messages, &options).await
    }
}
