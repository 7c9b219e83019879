//! Provider construction from settings

use std::sync::Arc;

use sales_agent_config::LlmConfig;
use sales_agent_core::ChatProvider;

use crate::backend::{BackendConfig, OpenAiCompatibleBackend};
use crate::router::{CallRouter, RouterConfig};
use crate::LlmError;

/// Build every enabled provider that has credentials, in configured order
pub fn build_providers(config: &LlmConfig) -> Result<Vec<Arc<dyn ChatProvider>>, LlmError> {
    let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();

    for provider in config.providers.iter().filter(|p| p.enabled) {
        let Some(backend_config) = BackendConfig::from_provider(provider, config.max_retries) else {
            tracing::info!(provider = %provider.name, "No API key configured, provider disabled");
            continue;
        };
        let backend = OpenAiCompatibleBackend::new(backend_config)?;
        tracing::info!(provider = %provider.name, model = %provider.model, "Chat provider enabled");
        providers.push(Arc::new(backend));
    }

    Ok(providers)
}

impl CallRouter {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self::new(build_providers(config)?, RouterConfig::from(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_agent_config::ProviderConfig;

    #[test]
    fn test_providers_with_keys_are_built_in_order() {
        let mut first = ProviderConfig::new("primary-test", "https://a.example.com/v1", "m1");
        first.api_key = Some("k1".into());
        let mut disabled = ProviderConfig::new("disabled-test", "https://b.example.com/v1", "m2");
        disabled.api_key = Some("k2".into());
        disabled.enabled = false;
        let missing_key = ProviderConfig::new("missing-test", "https://c.example.com/v1", "m3");
        let mut last = ProviderConfig::new("secondary-test", "https://d.example.com/v1", "m4");
        last.api_key = Some("k4".into());

        let config = LlmConfig {
            providers: vec![first, disabled, missing_key, last],
            ..Default::default()
        };

        let providers = build_providers(&config).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["primary-test", "secondary-test"]);
    }
}
