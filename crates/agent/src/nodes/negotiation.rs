use sales_agent_core::{ConversationSession, Node};

use super::{answer_question, NodeContext, Transition, TurnInput};
use crate::intents;
use crate::messages;

pub(crate) async fn handle(
    session: &mut ConversationSession,
    input: &TurnInput<'_>,
    ctx: &NodeContext<'_>,
) -> Transition {
    if !input.fresh {
        session.metadata.add_flag("negotiation_started");
        tracing::info!(session_id = %session.session_id, "Lead handed to sales team");
        return Transition::reply(Node::Negotiation, messages::negotiation_intro(session));
    }

    let lower = input.lower;

    if intents::NEGOTIATION_BACK.matches(lower) {
        return Transition::cascade(Node::Recommendation);
    }
    if intents::NEW_SEARCH.matches(lower) {
        session.recommendations.clear();
        session.profile.recommendation_shown = false;
        return Transition::reply(Node::Discovery, messages::NEW_SEARCH);
    }
    if intents::FAREWELL.matches(lower) {
        session.metadata.add_flag("conversation_ended");
        return Transition::reply(Node::End, messages::NEGOTIATION_EXIT);
    }
    if intents::TIMING.matches(lower) {
        return Transition::reply(Node::Negotiation, messages::CONTACT_TIMING);
    }
    if intents::is_question(lower) {
        let answer = answer_question(session, input.utterance, ctx, messages::ALREADY_FORWARDED).await;
        return Transition::reply(Node::Negotiation, answer);
    }

    Transition::reply(Node::Negotiation, messages::ALREADY_FORWARDED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::test_support::{input, recommendation, said, Fixture};

    async fn respond(session: &mut ConversationSession, fixture: &Fixture, text: &str) -> Transition {
        let turn = said(text);
        handle(session, &input(&turn, true), &fixture.context()).await
    }

    fn negotiating() -> ConversationSession {
        let mut session = ConversationSession::new("s1");
        session.node = Node::Negotiation;
        session.profile.name = Some("Ana".into());
        session.profile.recommendation_shown = true;
        session.recommendations = vec![recommendation("corolla-22", "Toyota", "Corolla", 98_000)];
        session
    }

    #[tokio::test]
    async fn test_entry_forwards_lead() {
        let fixture = Fixture::new();
        let mut session = negotiating();
        let turn = said("gostei do primeiro");
        let transition = handle(&mut session, &input(&turn, false), &fixture.context()).await;
        assert_eq!(transition.next, Node::Negotiation);
        assert!(transition.reply.unwrap().contains("consultores"));
        assert!(session.metadata.has_flag("negotiation_started"));
    }

    #[tokio::test]
    async fn test_back_to_recommendations() {
        let fixture = Fixture::new();
        let mut session = negotiating();
        assert_eq!(
            respond(&mut session, &fixture, "quero voltar").await,
            Transition::cascade(Node::Recommendation)
        );
        assert_eq!(session.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn test_new_search_resets_recommendations() {
        let fixture = Fixture::new();
        let mut session = negotiating();
        let transition = respond(&mut session, &fixture, "quero buscar outro tipo de carro").await;
        assert_eq!(transition.next, Node::Discovery);
        assert_eq!(transition.reply.as_deref(), Some(messages::NEW_SEARCH));
        assert!(session.recommendations.is_empty());
        assert!(!session.profile.recommendation_shown);
    }

    #[tokio::test]
    async fn test_farewell_ends_conversation() {
        let fixture = Fixture::new();
        let mut session = negotiating();
        let transition = respond(&mut session, &fixture, "valeu, tchau").await;
        assert_eq!(transition.next, Node::End);
        assert_eq!(transition.reply.as_deref(), Some(messages::NEGOTIATION_EXIT));
        assert!(session.metadata.has_flag("conversation_ended"));
    }

    #[tokio::test]
    async fn test_timing_question_gets_fixed_answer() {
        let fixture = Fixture::with_answer("resposta livre");
        let mut session = negotiating();
        let reply = respond(&mut session, &fixture, "quando vão me ligar?").await.reply;
        assert_eq!(reply.as_deref(), Some(messages::CONTACT_TIMING));
    }

    #[tokio::test]
    async fn test_open_question_goes_to_router() {
        let mut session = negotiating();

        let fixture = Fixture::with_answer("Sim, o Corolla tem 7 airbags.");
        let reply = respond(&mut session, &fixture, "ele tem airbag?").await.reply;
        assert_eq!(reply.as_deref(), Some("Sim, o Corolla tem 7 airbags."));

        let offline = Fixture::new();
        let reply = respond(&mut session, &offline, "ele tem airbag?").await.reply;
        assert_eq!(reply.as_deref(), Some(messages::ALREADY_FORWARDED));
    }

    #[tokio::test]
    async fn test_anything_else_is_acknowledged() {
        let fixture = Fixture::new();
        let mut session = negotiating();
        let transition = respond(&mut session, &fixture, "ok").await;
        assert_eq!(transition, Transition::reply(Node::Negotiation, messages::ALREADY_FORWARDED));
    }
}
