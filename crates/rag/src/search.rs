//! Vehicle search over the inventory store
//!
//! Semantic ranking is preferred. When no query embedding can be produced,
//! or nothing clears the similarity threshold inside a hybrid search, the
//! service degrades to keyword containment and then to filter-only
//! retrieval with fixed scores, cheapest first.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use metrics::histogram;
use serde::Serialize;

use sales_agent_config::constants::ranker::UNFILTERED_FALLBACK_SCORE;
use sales_agent_config::RankerConfig;
use sales_agent_core::{EmbeddingProvider, InventoryStore, VehicleFilters, VehicleSummary};

use crate::embeddings::vehicle_document;
use crate::similarity::cosine_similarity;
use crate::RagError;

const SYNC_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Semantic,
    Keyword,
    Filter,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub vehicle: VehicleSummary,
    pub score: f32,
    pub source: SearchSource,
}

impl SearchHit {
    fn new(mut vehicle: VehicleSummary, score: f32, source: SearchSource) -> Self {
        vehicle.embedding = None;
        Self { vehicle, score, source }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total: usize,
    pub with_embedding: usize,
    pub available: usize,
    /// One decimal and a percent sign, e.g. "80.0%"
    pub coverage: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub processed: usize,
    pub failed: usize,
}

pub struct VectorSearch {
    inventory: Arc<dyn InventoryStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    similarity_threshold: f32,
    keyword_score: f32,
    filter_score: f32,
    candidate_limit: usize,
}

impl VectorSearch {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RankerConfig,
    ) -> Self {
        Self {
            inventory,
            embedder,
            similarity_threshold: config.similarity_threshold,
            keyword_score: config.keyword_fallback_score,
            filter_score: config.filter_fallback_score,
            candidate_limit: config.candidate_limit,
        }
    }

    pub fn embeddings_available(&self) -> bool {
        self.embedder.is_available()
    }

    /// Embedding failures are logged and reported as unavailable
    async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        if !self.embedder.is_available() {
            return None;
        }
        match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(error = %e, "Query embedding failed, using fallback ranking");
                None
            }
        }
    }

    fn rank_semantic(&self, query: &[f32], candidates: Vec<VehicleSummary>, limit: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter_map(|v| {
                let score = cosine_similarity(query, v.embedding.as_deref()?);
                (score > self.similarity_threshold).then(|| SearchHit::new(v, score, SearchSource::Semantic))
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        hits
    }

    fn rank_keyword(&self, query: &str, candidates: &[VehicleSummary], limit: usize) -> Vec<SearchHit> {
        let query = query.to_lowercase();
        let mut matched: Vec<VehicleSummary> = candidates
            .iter()
            .filter(|v| keyword_match(&query, v))
            .cloned()
            .collect();
        matched.sort_by_key(|v| v.price);
        matched
            .into_iter()
            .take(limit)
            .map(|v| SearchHit::new(v, self.keyword_score, SearchSource::Keyword))
            .collect()
    }

    fn rank_filtered(&self, mut candidates: Vec<VehicleSummary>, filtered: bool, limit: usize) -> Vec<SearchHit> {
        let score = if filtered {
            self.filter_score
        } else {
            UNFILTERED_FALLBACK_SCORE
        };
        candidates.sort_by_key(|v| v.price);
        candidates
            .into_iter()
            .take(limit)
            .map(|v| SearchHit::new(v, score, SearchSource::Filter))
            .collect()
    }

    async fn available_vehicles(&self) -> Result<Vec<VehicleSummary>, RagError> {
        Ok(self
            .inventory
            .find_by_filters(&VehicleFilters::default(), self.candidate_limit.max(1) * 20)
            .await?)
    }

    /// Semantic search across available vehicles
    ///
    /// Without a query embedding this degrades to keyword containment.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, RagError> {
        let candidates = self.available_vehicles().await?;
        let hits = match self.embed_query(query).await {
            Some(vector) => self.rank_semantic(&vector, candidates, limit),
            None => self.rank_keyword(query, &candidates, limit),
        };
        tracing::debug!(query, results = hits.len(), "Semantic search");
        Ok(hits)
    }

    pub async fn filter_search(
        &self,
        filters: &VehicleFilters,
        limit: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        let candidates = self.inventory.find_by_filters(filters, self.candidate_limit).await?;
        Ok(self.rank_filtered(candidates, !filters.is_empty(), limit))
    }

    pub async fn hybrid_search(
        &self,
        query: &str,
        filters: &VehicleFilters,
        limit: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        let candidates = self.inventory.find_by_filters(filters, self.candidate_limit).await?;

        if let Some(vector) = self.embed_query(query).await {
            let hits = self.rank_semantic(&vector, candidates.clone(), limit);
            if !hits.is_empty() {
                histogram!("sales_agent_search_results").record(hits.len() as f64);
                tracing::debug!(results = hits.len(), "Hybrid search answered semantically");
                return Ok(hits);
            }
            tracing::debug!("No candidate above similarity threshold, using fallback ranking");
        }

        let keyword_hits = self.rank_keyword(query, &candidates, limit);
        let hits = if keyword_hits.is_empty() {
            self.rank_filtered(candidates, !filters.is_empty(), limit)
        } else {
            keyword_hits
        };
        histogram!("sales_agent_search_results").record(hits.len() as f64);
        tracing::debug!(results = hits.len(), source = ?hits.first().map(|h| h.source), "Hybrid search fallback");
        Ok(hits)
    }

    /// Vehicles closest to a stored vehicle's embedding, excluding itself
    pub async fn find_similar(&self, vehicle_id: &str, limit: usize) -> Result<Vec<SearchHit>, RagError> {
        let Some(source) = self.inventory.find_by_id(vehicle_id).await? else {
            return Ok(Vec::new());
        };
        let Some(vector) = source.embedding else {
            return Ok(Vec::new());
        };

        let candidates = self
            .available_vehicles()
            .await?
            .into_iter()
            .filter(|v| v.id != vehicle_id)
            .collect();
        Ok(self.rank_semantic(&vector, candidates, limit))
    }

    pub async fn stats(&self) -> Result<SearchStats, RagError> {
        let vehicles = self.inventory.scan().await?;
        let total = vehicles.len();
        let with_embedding = vehicles.iter().filter(|v| v.embedding.is_some()).count();
        let available = vehicles.iter().filter(|v| v.available).count();
        let coverage = if total == 0 {
            0.0
        } else {
            with_embedding as f64 / total as f64 * 100.0
        };

        Ok(SearchStats {
            total,
            with_embedding,
            available,
            coverage: format!("{:.1}%", coverage),
        })
    }

    /// Embed every vehicle that lacks an embedding
    pub async fn sync_embeddings(&self) -> Result<SyncReport, RagError> {
        if !self.embedder.is_available() {
            tracing::warn!("Embedding provider unavailable, skipping sync");
            return Ok(SyncReport::default());
        }

        let pending: Vec<VehicleSummary> = self
            .inventory
            .scan()
            .await?
            .into_iter()
            .filter(|v| v.embedding.is_none())
            .collect();

        let outcomes: Vec<bool> = stream::iter(pending)
            .map(|vehicle| async move {
                let document = vehicle_document(&vehicle);
                match self.embedder.embed(&document).await {
                    Ok(Some(vector)) => match self.inventory.set_embedding(&vehicle.id, vector).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(vehicle_id = %vehicle.id, error = %e, "Failed to store embedding");
                            false
                        }
                    },
                    Ok(None) => false,
                    Err(e) => {
                        tracing::warn!(vehicle_id = %vehicle.id, error = %e, "Failed to embed vehicle");
                        false
                    }
                }
            })
            .buffer_unordered(SYNC_CONCURRENCY)
            .collect()
            .await;

        let report = SyncReport {
            processed: outcomes.iter().filter(|ok| **ok).count(),
            failed: outcomes.iter().filter(|ok| !**ok).count(),
        };
        tracing::info!(processed = report.processed, failed = report.failed, "Embedding sync finished");
        Ok(report)
    }
}

/// Either a text field appears in the query or the query appears in a field
fn keyword_match(query: &str, vehicle: &VehicleSummary) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    [&vehicle.make, &vehicle.model, &vehicle.body_type]
        .into_iter()
        .map(|field| field.to_lowercase())
        .filter(|field| !field.is_empty())
        .any(|field| {
            field.contains(query)
                || query
                    .split_whitespace()
                    .any(|term| term.trim_matches(|c: char| !c.is_alphanumeric()) == field)
        })
}
