//! Conversational sales agent
//!
//! Features:
//! - Deterministic profile extraction from pt-BR utterances
//! - Node-based dialogue state machine with cascading transitions
//! - Suggested-action derivation for the client UI
//! - Per-session serialized turns over a concurrent session store

pub mod actions;
pub mod extractor;
pub mod intents;
pub mod machine;
pub mod messages;
pub mod nodes;
pub mod store;

pub use actions::{suggested_actions, SuggestedAction};
pub use extractor::{detect_name_correction, extract, extract_name, extract_trade_in, TradeInFacts};
pub use machine::{DialogueMachine, StartedSession, TurnResponse};
pub use nodes::Transition;
pub use store::SessionStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Routing exceeded {0} steps in one turn")]
    RoutingLoop(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sales_agent_core::Error> for AgentError {
    fn from(err: sales_agent_core::Error) -> Self {
        match err {
            sales_agent_core::Error::Inventory(msg) => AgentError::Inventory(msg),
            other => AgentError::Internal(other.to_string()),
        }
    }
}

impl From<AgentError> for sales_agent_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::SessionNotFound(id) => sales_agent_core::Error::Session(id),
            other => sales_agent_core::Error::Internal(other.to_string()),
        }
    }
}
