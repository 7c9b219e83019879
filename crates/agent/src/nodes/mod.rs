//! Node handlers of the dialogue state machine
//!
//! A handler mutates the session in place and returns a [`Transition`].
//! A transition with a reply ends the turn; one without a reply hands the
//! same utterance to the next node.

mod discovery;
mod financing;
mod greeting;
mod negotiation;
mod recommendation;
mod search;
mod terminal;
mod trade_in;

pub(crate) use greeting::SELECTED_VEHICLE_REASONING;
pub(crate) use search::shown_vehicle;

use sales_agent_core::{ChatMessage, ConversationSession, Node, Ranker};
use sales_agent_llm::CallRouter;
use sales_agent_tools::{FinancingCalculator, TradeInEstimator};

use crate::messages;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Node,
    pub reply: Option<String>,
}

impl Transition {
    pub fn reply(next: Node, text: impl Into<String>) -> Self {
        Self {
            next,
            reply: Some(text.into()),
        }
    }

    /// Continue into `next` within the same turn
    pub fn cascade(next: Node) -> Self {
        Self { next, reply: None }
    }
}

pub(crate) struct TurnInput<'a> {
    pub utterance: &'a str,
    pub lower: &'a str,
    /// False when the node was reached by a cascade in this turn
    pub fresh: bool,
}

/// Collaborators available to every handler
pub(crate) struct NodeContext<'a> {
    pub ranker: &'a dyn Ranker,
    pub router: Option<&'a CallRouter>,
    pub financing: &'a FinancingCalculator,
    pub trade_in: &'a TradeInEstimator,
    pub current_year: i32,
}

pub(crate) async fn dispatch(
    node: Node,
    session: &mut ConversationSession,
    input: &TurnInput<'_>,
    ctx: &NodeContext<'_>,
) -> Transition {
    match node {
        Node::Greeting => greeting::handle(session, input),
        Node::Discovery => discovery::handle(session, input),
        Node::Search => search::handle(session, ctx).await,
        Node::Recommendation => recommendation::handle(session, input, ctx).await,
        Node::Financing => financing::handle(session, input, ctx),
        Node::TradeIn => trade_in::handle(session, input, ctx),
        Node::Negotiation => negotiation::handle(session, input, ctx).await,
        Node::Handoff | Node::End => terminal::handle(node),
    }
}

/// Free-form answer from the chat router, or `fallback` when no provider answered
pub(crate) async fn answer_question(
    session: &ConversationSession,
    utterance: &str,
    ctx: &NodeContext<'_>,
    fallback: &str,
) -> String {
    let Some(router) = ctx.router else {
        return fallback.to_string();
    };

    let messages = [
        ChatMessage::system(messages::assistant_context(
            &session.profile,
            &session.recommendations,
        )),
        ChatMessage::user(utterance),
    ];
    let completion = router.complete_default(&messages).await;
    if completion.is_fallback() {
        fallback.to_string()
    } else {
        tracing::debug!(
            session_id = %session.session_id,
            provider = %completion.provider,
            "Answered open question"
        );
        completion.text
    }
}
