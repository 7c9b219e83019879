use sales_agent_core::{ConversationSession, Node};

use super::{Transition, TurnInput};
use crate::extractor::{detect_name_correction, extract};
use crate::intents;
use crate::messages;

pub(crate) fn handle(session: &mut ConversationSession, input: &TurnInput<'_>) -> Transition {
    if let Some(transition) = correct_name(session, input) {
        return transition;
    }

    if intents::HANDOFF.matches(input.lower) {
        session.metadata.add_flag("handoff_requested");
        return Transition::reply(Node::Handoff, messages::DISCOVERY_HANDOFF);
    }
    if intents::EXIT_STRICT.matches(input.lower.trim()) {
        return Transition::reply(Node::End, messages::DISCOVERY_EXIT);
    }

    let update = extract(input.utterance, &session.profile);
    session.profile.merge(update);

    if intents::FINANCING.matches(input.lower) {
        return Transition::cascade(Node::Financing);
    }
    if intents::TRADE_IN_DISCOVERY.matches(input.lower) {
        return Transition::cascade(Node::TradeIn);
    }
    if session.profile.can_recommend() {
        tracing::debug!(session_id = %session.session_id, "Enough context to search");
        return Transition::cascade(Node::Search);
    }

    session.metadata.loop_count += 1;
    Transition::reply(Node::Discovery, messages::clarifying_question(&session.profile))
}

/// A correction of a known name answers on its own; a first name given
/// here is stored and the utterance is processed as usual
fn correct_name(session: &mut ConversationSession, input: &TurnInput<'_>) -> Option<Transition> {
    let current = session.profile.name.clone();
    let corrected = detect_name_correction(input.utterance, current.as_deref())?;
    tracing::info!(session_id = %session.session_id, "Customer name corrected");
    session.profile.correct_name(corrected);
    if current.is_none() {
        return None;
    }

    let profile = &session.profile;
    let first_name = profile.first_name().unwrap_or_default();
    let follow_up = if profile.budget.is_none() {
        messages::CORRECTION_ASK_BUDGET
    } else if profile.usage.is_none() && profile.body_type.is_none() {
        messages::CORRECTION_ASK_USAGE
    } else if profile.can_recommend() {
        return Some(Transition::reply(
            Node::Search,
            messages::name_corrected_searching(first_name),
        ));
    } else {
        messages::CORRECTION_ASK_ANYTHING
    };
    Some(Transition::reply(
        Node::Discovery,
        messages::name_corrected(first_name, follow_up),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::test_support::{input, said};
    use sales_agent_core::BodyType;

    fn discover(session: &mut ConversationSession, text: &str) -> Transition {
        let turn = said(text);
        handle(session, &input(&turn, true))
    }

    fn session_named(name: &str) -> ConversationSession {
        let mut session = ConversationSession::new("s1");
        session.profile.name = Some(name.into());
        session.node = Node::Discovery;
        session
    }

    #[test]
    fn test_enough_context_cascades_to_search() {
        let mut session = session_named("Maria");
        let transition = discover(&mut session, "Quero um sedan até 100 mil");
        assert_eq!(transition, Transition::cascade(Node::Search));
        assert_eq!(session.profile.body_type, Some(BodyType::Sedan));
        assert_eq!(session.profile.budget, Some(100_000));
    }

    #[test]
    fn test_vague_message_asks_and_counts_loop() {
        let mut session = session_named("Maria");
        let transition = discover(&mut session, "não sei ainda");
        assert_eq!(transition.next, Node::Discovery);
        assert!(transition.reply.unwrap().starts_with("Maria, pra te ajudar melhor"));
        assert_eq!(session.metadata.loop_count, 1);
    }

    #[test]
    fn test_name_correction_overrides_everything() {
        let mut session = session_named("Rafaek");
        let transition = discover(&mut session, "Rafael");
        assert_eq!(session.profile.name.as_deref(), Some("Rafael"));
        assert_eq!(transition.next, Node::Discovery);
        let reply = transition.reply.unwrap();
        assert!(reply.contains("Desculpa pelo erro, Rafael!"));
        assert!(reply.contains("faixa de orçamento"));
    }

    #[test]
    fn test_correction_with_full_profile_goes_to_search() {
        let mut session = session_named("Rafaek");
        session.profile.budget = Some(80_000);
        session.profile.body_type = Some(BodyType::Suv);
        let transition = discover(&mut session, "meu nome é Rafael");
        assert_eq!(transition.next, Node::Search);
        assert!(transition.reply.unwrap().contains("Deixa eu buscar"));
    }

    #[test]
    fn test_handoff_and_exit() {
        let mut session = session_named("Maria");
        let transition = discover(&mut session, "quero falar com um vendedor");
        assert_eq!(transition.next, Node::Handoff);
        assert!(session.metadata.has_flag("handoff_requested"));

        let mut session = session_named("Maria");
        assert_eq!(discover(&mut session, "tchau").next, Node::End);
    }

    #[test]
    fn test_financing_and_trade_in_cascade() {
        let mut session = session_named("Maria");
        assert_eq!(
            discover(&mut session, "quero financiar"),
            Transition::cascade(Node::Financing)
        );
        assert!(session.profile.financing.wants_financing);

        let mut session = session_named("Maria");
        assert_eq!(
            discover(&mut session, "tenho um gol pra dar na troca"),
            Transition::cascade(Node::TradeIn)
        );
        assert!(session.profile.trade_in.has_trade_in);
    }
}
