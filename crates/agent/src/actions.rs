//! Suggested next actions for the client UI

use serde::{Deserialize, Serialize};

use sales_agent_core::ConversationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestedAction {
    HandoffHuman,
    ScheduleVisit,
    ShowDetails,
    ShowFinancing,
    FinancingSimulation,
    TradeInEvaluation,
    Retry,
}

impl SuggestedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::HandoffHuman => "HANDOFF_HUMAN",
            SuggestedAction::ScheduleVisit => "SCHEDULE_VISIT",
            SuggestedAction::ShowDetails => "SHOW_DETAILS",
            SuggestedAction::ShowFinancing => "SHOW_FINANCING",
            SuggestedAction::FinancingSimulation => "FINANCING_SIMULATION",
            SuggestedAction::TradeInEvaluation => "TRADE_IN_EVALUATION",
            SuggestedAction::Retry => "RETRY",
        }
    }
}

/// Derived after every turn from flags, recommendations and profile
pub fn suggested_actions(session: &ConversationSession) -> Vec<SuggestedAction> {
    let mut actions = Vec::new();

    if session.metadata.has_flag("handoff_requested") {
        actions.push(SuggestedAction::HandoffHuman);
    }
    if session.metadata.has_flag("visit_requested") {
        actions.push(SuggestedAction::ScheduleVisit);
    }
    if !session.recommendations.is_empty() {
        actions.push(SuggestedAction::ShowDetails);
        actions.push(SuggestedAction::ShowFinancing);
    }
    if session.profile.financing.wants_financing {
        actions.push(SuggestedAction::FinancingSimulation);
    }
    if session.profile.trade_in.has_trade_in {
        actions.push(SuggestedAction::TradeInEvaluation);
    }

    actions
}
