//! Dialogue state machine
//!
//! A turn starts at the session's stored node and follows cascading
//! transitions until a handler produces a reply.

use std::sync::Arc;

use chrono::Datelike;
use metrics::counter;
use serde::Serialize;
use uuid::Uuid;

use sales_agent_core::{
    ConversationSession, InventoryStore, Node, Ranker, VehicleCard, VehicleRecommendation,
    VehicleSummary,
};
use sales_agent_llm::CallRouter;
use sales_agent_tools::{FinancingCalculator, TradeInEstimator};

use crate::actions::{suggested_actions, SuggestedAction};
use crate::messages;
use crate::nodes::{self, NodeContext, TurnInput, SELECTED_VEHICLE_REASONING};
use crate::store::SessionStore;
use crate::AgentError;

/// Upper bound on nodes visited in one turn
const MAX_STEPS: usize = 8;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub response: String,
    pub suggested_actions: Vec<SuggestedAction>,
    pub recommendations: Vec<VehicleRecommendation>,
    pub current_node: Node,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    pub session_id: String,
    pub greeting: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleSummary>,
}

pub struct DialogueMachine {
    store: Arc<SessionStore>,
    inventory: Arc<dyn InventoryStore>,
    ranker: Arc<dyn Ranker>,
    router: Option<Arc<CallRouter>>,
    financing: FinancingCalculator,
    trade_in: TradeInEstimator,
}

impl DialogueMachine {
    pub fn new(
        store: Arc<SessionStore>,
        inventory: Arc<dyn InventoryStore>,
        ranker: Arc<dyn Ranker>,
        router: Option<Arc<CallRouter>>,
        financing: FinancingCalculator,
        trade_in: TradeInEstimator,
    ) -> Self {
        Self {
            store,
            inventory,
            ranker,
            router,
            financing,
            trade_in,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn inventory(&self) -> &Arc<dyn InventoryStore> {
        &self.inventory
    }

    pub fn router(&self) -> Option<&Arc<CallRouter>> {
        self.router.as_ref()
    }

    /// Create a session and run its opening turn
    pub async fn start_session(
        &self,
        vehicle_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<StartedSession, AgentError> {
        let session_id = Uuid::new_v4().to_string();
        let mut session = ConversationSession::new(&session_id);
        session.metadata.user_id = user_id.map(str::to_string);

        let vehicle = match vehicle_id {
            Some(id) => self.find_vehicle(id).await,
            None => None,
        };

        let utterance = match &vehicle {
            Some(vehicle) => {
                seed_selected_vehicle(&mut session, vehicle);
                format!(
                    "Estou interessado no {} {} {}",
                    vehicle.make, vehicle.model, vehicle.year
                )
            }
            None => "Olá".to_string(),
        };

        let turn = self.run_turn(&mut session, &utterance).await;
        self.store.set(session);

        counter!("sales_agent_sessions_created_total").increment(1);
        tracing::info!(
            session_id = %session_id,
            vehicle = ?vehicle.as_ref().map(|v| v.id.as_str()),
            "Session created"
        );

        Ok(StartedSession {
            session_id,
            greeting: turn.response,
            vehicle,
        })
    }

    /// An unknown vehicle id starts a plain session
    async fn find_vehicle(&self, id: &str) -> Option<VehicleSummary> {
        match self.inventory.find_by_id(id).await {
            Ok(Some(vehicle)) => Some(vehicle),
            Ok(None) => {
                tracing::warn!(vehicle_id = id, "Selected vehicle not found");
                None
            }
            Err(e) => {
                tracing::warn!(vehicle_id = id, error = %e, "Selected vehicle lookup failed");
                None
            }
        }
    }

    pub async fn handle_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<TurnResponse, AgentError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(|| AgentError::SessionNotFound(session_id.to_string()))?;
        let mut session = handle.lock().await;
        Ok(self.run_turn(&mut session, content).await)
    }

    async fn run_turn(&self, session: &mut ConversationSession, utterance: &str) -> TurnResponse {
        session.push_human(utterance);
        let start = session.node;

        match self.route(session, utterance).await {
            Ok(response) => TurnResponse {
                response,
                suggested_actions: suggested_actions(session),
                recommendations: session.recommendations.clone(),
                current_node: session.node,
            },
            Err(e) => {
                tracing::error!(session_id = %session.session_id, node = %start, error = %e, "Turn failed");
                session.node = start;
                session.metadata.error_count += 1;
                session.push_assistant(messages::TURN_FAILURE);
                TurnResponse {
                    response: messages::TURN_FAILURE.to_string(),
                    suggested_actions: vec![SuggestedAction::Retry, SuggestedAction::HandoffHuman],
                    recommendations: session.recommendations.clone(),
                    current_node: start,
                }
            }
        }
    }

    async fn route(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
    ) -> Result<String, AgentError> {
        let ctx = NodeContext {
            ranker: self.ranker.as_ref(),
            router: self.router.as_deref(),
            financing: &self.financing,
            trade_in: &self.trade_in,
            current_year: chrono::Utc::now().year(),
        };
        let lower = utterance.to_lowercase();
        let mut fresh = true;

        for _ in 0..MAX_STEPS {
            let node = session.node;
            counter!("sales_agent_turns_total", "node" => node.as_str()).increment(1);
            tracing::debug!(session_id = %session.session_id, node = %node, fresh, "Entering node");

            let input = TurnInput {
                utterance,
                lower: &lower,
                fresh,
            };
            let transition = nodes::dispatch(node, session, &input, &ctx).await;

            if transition.next != node {
                tracing::info!(
                    session_id = %session.session_id,
                    from = %node,
                    to = %transition.next,
                    "Node transition"
                );
            }
            session.node = transition.next;

            if let Some(reply) = transition.reply {
                session.push_assistant(reply.clone());
                return Ok(reply);
            }
            fresh = false;
        }

        Err(AgentError::RoutingLoop(MAX_STEPS))
    }
}

/// The listing the customer came from is treated as already recommended
fn seed_selected_vehicle(session: &mut ConversationSession, vehicle: &VehicleSummary) {
    let recommendation = VehicleRecommendation {
        vehicle_id: vehicle.id.clone(),
        match_score: 100,
        reasoning: SELECTED_VEHICLE_REASONING.to_string(),
        highlights: Vec::new(),
        concerns: Vec::new(),
        vehicle: VehicleCard::from(vehicle),
    };

    let profile = &mut session.profile;
    profile.last_shown = vec![nodes::shown_vehicle(&recommendation)];
    if profile.budget.is_none() {
        profile.budget = Some(vehicle.price.saturating_mul(12) / 10);
    }
    if profile.body_type.is_none() {
        profile.body_type = vehicle.body();
    }
    session.recommendations = vec![recommendation];
}
