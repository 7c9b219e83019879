//! Core traits and types for the vehicle sales agent
//!
//! This crate provides foundational types used across all other crates:
//! - Customer profile and the partial updates produced by extraction
//! - Vehicle summaries, filters and recommendations
//! - Conversation session state and dialogue nodes
//! - Chat-completion message types
//! - Collaborator traits (inventory, embeddings, chat providers, ranking)
//! - Error types

pub mod conversation;
pub mod error;
pub mod format;
pub mod llm_types;
pub mod profile;
pub mod traits;
pub mod vehicle;

pub use conversation::{
    ConversationMessage, ConversationSession, MessageRole, Node, SessionMetadata,
};
pub use error::{Error, Result};
pub use llm_types::{ChatMessage, ChatRole, Completion, CompletionOptions, TokenUsage};
pub use profile::{
    BodyType, CustomerProfile, FinancingPreference, FuelType, ProfileUpdate, ShownVehicle,
    TradeIn, Transmission, UsageCategory, Urgency,
};
pub use traits::{ChatProvider, EmbeddingProvider, InventoryStore, Ranker};
pub use vehicle::{VehicleCard, VehicleFilters, VehicleRecommendation, VehicleSummary};
