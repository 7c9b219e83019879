use async_trait::async_trait;

use crate::Result;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// `Ok(None)` means the provider is unavailable and callers should
    /// degrade to non-semantic ranking.
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>>;

    fn is_available(&self) -> bool;

    fn model_name(&self) -> &str;
}
