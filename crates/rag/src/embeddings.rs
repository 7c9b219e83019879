//! OpenAI embeddings
//!
//! Without an API key the embedder reports itself unavailable and every
//! request resolves to `Ok(None)`, which downstream search treats as a
//! signal to fall back to structural ranking.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use sales_agent_config::EmbeddingConfig;
use sales_agent_core::format::km;
use sales_agent_core::{EmbeddingProvider, VehicleSummary};

use crate::RagError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config.resolved_api_key();
        if api_key.is_none() {
            tracing::warn!("No embedding API key configured, semantic search disabled");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            api_key,
        })
    }

    async fn request(&self, input: &str) -> Result<Option<Vec<f32>>, RagError> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input,
                dimensions: self.dimensions,
            })
            .send()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("API error {}: {}", status.as_u16(), body)));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Invalid response: {}", e)))?;
        body.data
            .into_iter()
            .next()
            .map(|d| Some(d.embedding))
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> sales_agent_core::Result<Option<Vec<f32>>> {
        Ok(self.request(text).await?)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn condition_label(condition: &str) -> &str {
    match condition.to_ascii_lowercase().as_str() {
        "used" => "Seminovo",
        "new" => "Novo",
        _ => condition,
    }
}

/// Text embedded for a vehicle
pub fn vehicle_document(vehicle: &VehicleSummary) -> String {
    let mut parts = vec![format!("{} {} {}", vehicle.make, vehicle.model, vehicle.year)];

    if !vehicle.body_type.is_empty() {
        parts.push(vehicle.body_type.clone());
    }
    parts.push(condition_label(&vehicle.condition).to_string());
    if !vehicle.tags.is_empty() {
        parts.push(vehicle.tags.join(", "));
    }
    parts.push(km(vehicle.mileage));

    for value in [&vehicle.transmission, &vehicle.fuel, &vehicle.color]
        .into_iter()
        .flatten()
    {
        parts.push(value.clone());
    }

    if !vehicle.features.is_empty() {
        parts.push(format!("Opcionais: {}", vehicle.features.join(", ")));
    }

    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corolla() -> VehicleSummary {
        VehicleSummary {
            id: "v1".into(),
            make: "Toyota".into(),
            model: "Corolla".into(),
            year: 2023,
            price: 120_000,
            mileage: 15_000,
            body_type: "Sedan".into(),
            condition: "used".into(),
            tags: vec!["econômico".into()],
            features: vec!["Ar condicionado".into(), "Câmera de ré".into()],
            transmission: Some("Automático".into()),
            fuel: Some("Flex".into()),
            color: None,
            seats: Some(5),
            available: true,
            embedding: None,
        }
    }

    #[test]
    fn test_vehicle_document_fields() {
        let text = vehicle_document(&corolla());
        assert!(text.starts_with("Toyota Corolla 2023"));
        assert!(text.contains("Sedan"));
        assert!(text.contains("Seminovo"));
        assert!(text.contains("15.000 km"));
        assert!(text.contains("Automático"));
        assert!(text.contains("Opcionais: Ar condicionado, Câmera de ré"));
    }

    #[test]
    fn test_vehicle_document_without_features() {
        let mut vehicle = corolla();
        vehicle.features.clear();
        assert!(!vehicle_document(&vehicle).contains("Opcionais:"));
    }

    #[tokio::test]
    async fn test_without_key_is_unavailable() {
        let config = EmbeddingConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_key: None,
            ..Default::default()
        };
        // The env fallback may be present on a developer machine
        if config.resolved_api_key().is_some() {
            return;
        }
        let embedder = OpenAiEmbedder::new(&config).unwrap();
        assert!(!embedder.is_available());
        assert_eq!(embedder.embed("sedan").await.unwrap(), None);
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }
}
