use async_trait::async_trait;

use crate::vehicle::{VehicleFilters, VehicleSummary};
use crate::Result;

/// Source of vehicle records
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Available vehicles matching `filters`, at most `limit`
    async fn find_by_filters(
        &self,
        filters: &VehicleFilters,
        limit: usize,
    ) -> Result<Vec<VehicleSummary>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<VehicleSummary>>;

    /// Every stored vehicle, including unavailable ones
    async fn scan(&self) -> Result<Vec<VehicleSummary>>;

    async fn set_embedding(&self, id: &str, embedding: Vec<f32>) -> Result<()>;
}
