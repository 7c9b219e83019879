//! Sales Agent Server
//!
//! HTTP endpoints for chat sessions and vehicle search.

pub mod http;
pub mod metrics;
pub mod reaper;
pub mod state;

pub use http::create_router;
pub use metrics::init_metrics;
pub use reaper::start_idle_reaper;
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use sales_agent_agent::AgentError;
use sales_agent_rag::RagError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        if matches!(self, ServerError::Internal(_)) {
            tracing::error!(error = %message, "Request failed");
        }
        let status = StatusCode::from(self);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::SessionNotFound(id) => ServerError::SessionNotFound(id),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<RagError> for ServerError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::NotFound(what) => ServerError::InvalidRequest(format!("not found: {}", what)),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
