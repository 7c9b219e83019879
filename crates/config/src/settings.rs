//! Main settings module

use std::collections::HashMap;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{embedding, endpoints, financing, llm, ranker, trade_in};
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Chat-completion providers and routing
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub ranker: RankerConfig,

    #[serde(default)]
    pub financing: FinancingConfig,

    #[serde(default)]
    pub trade_in: TradeInConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub inventory: InventoryConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_ranker()?;
        self.validate_financing()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port must be non-zero"));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.providers.is_empty() {
            return Err(invalid("llm.providers", "At least one provider is required"));
        }
        if self.llm.failure_threshold == 0 {
            return Err(invalid("llm.failure_threshold", "Must be at least 1"));
        }
        Ok(())
    }

    fn validate_ranker(&self) -> Result<(), ConfigError> {
        let threshold = self.ranker.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(
                "ranker.similarity_threshold",
                format!("Must be between 0.0 and 1.0, got {}", threshold),
            ));
        }
        if self.ranker.budget_flexibility < 1.0 {
            return Err(invalid(
                "ranker.budget_flexibility",
                format!("Must be at least 1.0, got {}", self.ranker.budget_flexibility),
            ));
        }
        Ok(())
    }

    fn validate_financing(&self) -> Result<(), ConfigError> {
        let f = &self.financing;
        if f.monthly_rate <= 0.0 || f.monthly_rate >= 1.0 {
            return Err(invalid(
                "financing.monthly_rate",
                format!("Must be in (0, 1), got {}", f.monthly_rate),
            ));
        }
        if !(0.0..1.0).contains(&f.default_down_payment_ratio) {
            return Err(invalid(
                "financing.default_down_payment_ratio",
                format!("Must be in [0, 1), got {}", f.default_down_payment_ratio),
            ));
        }
        if f.default_term_months == 0 || f.alternative_terms.contains(&0) {
            return Err(invalid("financing.default_term_months", "Terms must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// One chat-completion provider, OpenAI-compatible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    /// Falls back to `<NAME>_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_provider_timeout() -> u64 {
    llm::REQUEST_TIMEOUT_SECS
}

impl ProviderConfig {
    pub fn new(name: &str, base_url: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: None,
            timeout_secs: llm::REQUEST_TIMEOUT_SECS,
            enabled: true,
        }
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| {
            let var = format!("{}_API_KEY", self.name.to_uppercase());
            non_empty(std::env::var(var).ok())
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Tried in order; the first healthy provider wins
    pub providers: Vec<ProviderConfig>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Retries of retryable errors within one provider call
    pub max_retries: u32,
    /// Consecutive failures before a provider's circuit opens
    pub failure_threshold: u32,
    pub open_duration_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderConfig::new("openai", endpoints::OPENAI_BASE_URL, endpoints::OPENAI_MODEL),
                ProviderConfig::new("groq", endpoints::GROQ_BASE_URL, endpoints::GROQ_MODEL),
            ],
            temperature: llm::TEMPERATURE,
            max_tokens: llm::MAX_TOKENS,
            max_retries: llm::MAX_RETRIES,
            failure_threshold: llm::FAILURE_THRESHOLD,
            open_duration_secs: llm::OPEN_DURATION_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    /// Falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            model: embedding::MODEL.to_string(),
            dimensions: embedding::DIMENSIONS,
            api_key: None,
            timeout_secs: llm::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl EmbeddingConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone())
            .or_else(|| non_empty(std::env::var("OPENAI_API_KEY").ok()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub similarity_threshold: f32,
    pub budget_flexibility: f64,
    pub max_recommendations: usize,
    /// Candidates pulled from the store before scoring
    pub candidate_limit: usize,
    pub keyword_fallback_score: f32,
    pub filter_fallback_score: f32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: ranker::SIMILARITY_THRESHOLD,
            budget_flexibility: ranker::BUDGET_FLEXIBILITY,
            max_recommendations: ranker::MAX_RECOMMENDATIONS,
            candidate_limit: ranker::CANDIDATE_LIMIT,
            keyword_fallback_score: ranker::KEYWORD_FALLBACK_SCORE,
            filter_fallback_score: ranker::FILTER_FALLBACK_SCORE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingConfig {
    pub monthly_rate: f64,
    pub default_down_payment_ratio: f64,
    pub default_term_months: u32,
    pub alternative_terms: Vec<u32>,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            monthly_rate: financing::MONTHLY_RATE,
            default_down_payment_ratio: financing::DEFAULT_DOWN_PAYMENT_RATIO,
            default_term_months: financing::DEFAULT_TERM_MONTHS,
            alternative_terms: financing::ALTERNATIVE_TERMS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeInConfig {
    pub base_value: f64,
    pub annual_depreciation: f64,
    pub expected_km_per_year: u32,
    /// Lowercase brand → value multiplier; unknown brands use 1.0
    pub brand_multipliers: HashMap<String, f64>,
}

impl Default for TradeInConfig {
    fn default() -> Self {
        Self {
            base_value: trade_in::BASE_VALUE,
            annual_depreciation: trade_in::ANNUAL_DEPRECIATION,
            expected_km_per_year: trade_in::EXPECTED_KM_PER_YEAR,
            brand_multipliers: trade_in::BRAND_MULTIPLIERS
                .iter()
                .map(|(brand, m)| (brand.to_string(), *m))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle longer than this are cleared; 0 disables reaping
    pub idle_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 0,
            cleanup_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// JSON, YAML or TOML vehicle catalogue loaded at startup
    pub catalog_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_json: bool,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/default`, `config/<env>` and the environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SALES_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        providers = settings.llm.providers.len(),
        "Settings loaded"
    );

    Ok(settings)
}
