//! Configuration management for the sales agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (SALES_AGENT_ prefix, `__` separator)
//! - Provider key fallbacks (`OPENAI_API_KEY`, `GROQ_API_KEY`)

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, EmbeddingConfig, FinancingConfig, InventoryConfig, LlmConfig,
    ObservabilityConfig, ProviderConfig, RankerConfig, RuntimeEnvironment, ServerConfig,
    SessionConfig, Settings, TradeInConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
