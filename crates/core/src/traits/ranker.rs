use async_trait::async_trait;

use crate::profile::CustomerProfile;
use crate::vehicle::VehicleRecommendation;
use crate::Result;

/// Produces scored, explained recommendations for a profile
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn recommend(
        &self,
        profile: &CustomerProfile,
        limit: usize,
    ) -> Result<Vec<VehicleRecommendation>>;
}
