//! In-memory vehicle inventory
//!
//! Catalogues are loaded from JSON, YAML or TOML files holding a
//! `vehicles` array of [`VehicleSummary`] records.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use sales_agent_core::{InventoryStore, Result, VehicleFilters, VehicleSummary};

use crate::RagError;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    vehicles: Vec<VehicleSummary>,
}

/// Read a vehicle catalogue, dispatching on file extension
pub fn load_catalog(path: &Path) -> std::result::Result<Vec<VehicleSummary>, RagError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RagError::Catalog(format!("{}: {}", path.display(), e)))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let file: CatalogFile = match extension.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| RagError::Catalog(e.to_string()))?,
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| RagError::Catalog(e.to_string()))?
        }
        "toml" => toml::from_str(&content).map_err(|e| RagError::Catalog(e.to_string()))?,
        other => {
            return Err(RagError::Catalog(format!(
                "Unsupported catalog format: {:?}",
                other
            )))
        }
    };

    tracing::info!(path = %path.display(), vehicles = file.vehicles.len(), "Loaded vehicle catalog");
    Ok(file.vehicles)
}

#[derive(Default)]
pub struct InMemoryInventory {
    vehicles: RwLock<Vec<VehicleSummary>>,
}

impl InMemoryInventory {
    pub fn new(vehicles: Vec<VehicleSummary>) -> Self {
        Self {
            vehicles: RwLock::new(vehicles),
        }
    }

    pub fn from_file(path: &Path) -> std::result::Result<Self, RagError> {
        Ok(Self::new(load_catalog(path)?))
    }

    pub fn len(&self) -> usize {
        self.vehicles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.read().is_empty()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventory {
    async fn find_by_filters(
        &self,
        filters: &VehicleFilters,
        limit: usize,
    ) -> Result<Vec<VehicleSummary>> {
        Ok(self
            .vehicles
            .read()
            .iter()
            .filter(|v| v.available && filters.matches(v))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<VehicleSummary>> {
        Ok(self.vehicles.read().iter().find(|v| v.id == id).cloned())
    }

    async fn scan(&self) -> Result<Vec<VehicleSummary>> {
        Ok(self.vehicles.read().clone())
    }

    async fn set_embedding(&self, id: &str, embedding: Vec<f32>) -> Result<()> {
        let mut vehicles = self.vehicles.write();
        let vehicle = vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| RagError::NotFound(format!("vehicle {}", id)))?;
        vehicle.embedding = Some(embedding);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vehicle(id: &str, price: u64, available: bool) -> VehicleSummary {
        VehicleSummary {
            id: id.into(),
            make: "Honda".into(),
            model: "Civic".into(),
            year: 2020,
            price,
            mileage: 50_000,
            body_type: "Sedan".into(),
            condition: "used".into(),
            tags: vec![],
            features: vec![],
            transmission: None,
            fuel: None,
            color: None,
            seats: None,
            available,
            embedding: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_filters_skips_unavailable() {
        let inventory = InMemoryInventory::new(vec![
            vehicle("a", 90_000, true),
            vehicle("b", 80_000, false),
            vehicle("c", 150_000, true),
        ]);
        let filters = VehicleFilters {
            price_max: Some(100_000),
            ..Default::default()
        };
        let found = inventory.find_by_filters(&filters, 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
        assert_eq!(inventory.scan().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_set_embedding_unknown_vehicle() {
        let inventory = InMemoryInventory::default();
        assert!(inventory.set_embedding("missing", vec![1.0]).await.is_err());
    }

    #[test]
    fn test_load_json_catalog() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"vehicles": [{{"id": "v1", "make": "Fiat", "model": "Argo", "year": 2021, "price": 65000, "mileage": 30000, "bodyType": "Hatch"}}]}}"#
        )
        .unwrap();

        let vehicles = load_catalog(file.path()).unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].body_type, "Hatch");
        assert!(vehicles[0].available);
        assert_eq!(vehicles[0].condition, "used");
    }

    #[test]
    fn test_load_yaml_catalog() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "vehicles:\n  - id: v2\n    make: Jeep\n    model: Compass\n    year: 2022\n    price: 140000\n    bodyType: SUV"
        )
        .unwrap();

        let vehicles = load_catalog(file.path()).unwrap();
        assert_eq!(vehicles[0].make, "Jeep");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(matches!(load_catalog(file.path()), Err(RagError::Catalog(_))));
    }
}
