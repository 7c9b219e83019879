//! Vehicle retrieval for the sales agent
//!
//! Features:
//! - Cosine similarity scoring
//! - OpenAI embeddings with graceful degradation when no key is configured
//! - In-memory inventory loaded from a JSON/YAML/TOML catalogue
//! - Semantic, structural and hybrid vehicle search
//! - Profile-driven recommendation ranking with explanations

pub mod embeddings;
pub mod inventory;
pub mod ranker;
pub mod search;
pub mod similarity;

pub use embeddings::{vehicle_document, OpenAiEmbedder};
pub use inventory::{load_catalog, InMemoryInventory};
pub use ranker::{RankerSettings, VehicleRanker};
pub use search::{SearchHit, SearchSource, SearchStats, SyncReport, VectorSearch};
pub use similarity::cosine_similarity;

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RagError> for sales_agent_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Embedding(msg) => sales_agent_core::Error::Embedding(msg),
            RagError::Inventory(msg) => sales_agent_core::Error::Inventory(msg),
            other => sales_agent_core::Error::Rag(other.to_string()),
        }
    }
}

impl From<sales_agent_core::Error> for RagError {
    fn from(err: sales_agent_core::Error) -> Self {
        match err {
            sales_agent_core::Error::Embedding(msg) => RagError::Embedding(msg),
            other => RagError::Inventory(other.to_string()),
        }
    }
}
