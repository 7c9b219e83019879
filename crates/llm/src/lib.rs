//! Chat-completion integration
//!
//! Features:
//! - OpenAI-compatible HTTP backend (OpenAI, Groq, local servers)
//! - Exponential backoff for transient failures
//! - Per-provider circuit breakers
//! - Priority-ordered routing with a non-failing fallback reply

pub mod backend;
pub mod circuit_breaker;
pub mod factory;
pub mod router;

pub use backend::{BackendConfig, OpenAiCompatibleBackend};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use factory::build_providers;
pub use router::{CallRouter, ProviderStatus, RoutedCompletion, RouterConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No provider available")]
    NoProviderAvailable,
}

impl LlmError {
    /// Transient errors worth retrying against the same provider
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::Timeout => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for sales_agent_core::Error {
    fn from(err: LlmError) -> Self {
        sales_agent_core::Error::Llm(err.to_string())
    }
}
