//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use sales_agent_agent::{DialogueMachine, SessionStore};
use sales_agent_config::Settings;
use sales_agent_rag::VectorSearch;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub machine: Arc<DialogueMachine>,
    pub search: Arc<VectorSearch>,
    /// Absent when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, machine: DialogueMachine, search: Arc<VectorSearch>) -> Self {
        Self {
            config: Arc::new(config),
            machine: Arc::new(machine),
            search,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.machine.store()
    }

    pub fn llm_available(&self) -> bool {
        self.machine.router().is_some_and(|router| router.is_available())
    }
}
