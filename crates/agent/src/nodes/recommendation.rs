use sales_agent_core::{ConversationSession, Node};

use super::{answer_question, NodeContext, Transition, TurnInput};
use crate::extractor::extract_name;
use crate::intents;
use crate::messages;

pub(crate) async fn handle(
    session: &mut ConversationSession,
    input: &TurnInput<'_>,
    ctx: &NodeContext<'_>,
) -> Transition {
    if !input.fresh {
        return Transition::reply(
            Node::Recommendation,
            messages::recommendation_list(&session.recommendations),
        );
    }

    let lower = input.lower;

    let choice = intents::DETAIL_CHOICE
        .capture(lower)
        .and_then(|c| c.parse::<usize>().ok())
        .and_then(|n| session.recommendations.get(n.checked_sub(1)?));
    if let Some(rec) = choice {
        let text = messages::vehicle_detail(rec);
        let flag = format!("viewed_vehicle_{}", rec.vehicle_id);
        session.metadata.add_flag(flag);
        return Transition::reply(Node::Recommendation, text);
    }

    if intents::VISIT.matches(lower) {
        session.metadata.add_flag("visit_requested");
        return Transition::reply(Node::Negotiation, messages::VISIT_REQUESTED);
    }
    if intents::HANDOFF.matches(lower) {
        session.metadata.add_flag("handoff_requested");
        return Transition::reply(Node::Handoff, messages::RECOMMENDATION_HANDOFF);
    }
    if intents::FINANCING.matches(lower) {
        return Transition::cascade(Node::Financing);
    }
    if intents::TRADE_IN.matches(lower) {
        return Transition::cascade(Node::TradeIn);
    }
    if intents::PURCHASE.matches(lower) {
        return Transition::cascade(Node::Negotiation);
    }
    if intents::MORE_OPTIONS.matches(lower) {
        session.profile.recommendation_shown = false;
        return Transition::cascade(Node::Search);
    }

    // Customers who arrived from a listing are asked for their name first
    if session.profile.name.is_none() {
        if let Some(name) = extract_name(input.utterance) {
            session.profile.name = Some(name);
            let first_name = session.profile.first_name().unwrap_or_default();
            return Transition::reply(
                Node::Recommendation,
                messages::name_acknowledged(first_name, messages::RECOMMENDATION_HELP),
            );
        }
    }

    if intents::is_question(lower) {
        let answer = answer_question(session, input.utterance, ctx, messages::RECOMMENDATION_HELP).await;
        return Transition::reply(Node::Recommendation, answer);
    }

    Transition::reply(Node::Recommendation, messages::RECOMMENDATION_HELP)
}
