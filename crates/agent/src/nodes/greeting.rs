use sales_agent_core::{ConversationSession, Node};

use super::{Transition, TurnInput};
use crate::extractor::extract;
use crate::messages;

/// Reasoning attached to a vehicle the customer picked before chatting
pub(crate) const SELECTED_VEHICLE_REASONING: &str = "Veículo que você selecionou";

pub(crate) fn handle(session: &mut ConversationSession, input: &TurnInput<'_>) -> Transition {
    let selected = session
        .recommendations
        .first()
        .filter(|rec| rec.reasoning == SELECTED_VEHICLE_REASONING)
        .map(|rec| rec.vehicle.clone());
    if let Some(vehicle) = selected {
        tracing::debug!(session_id = %session.session_id, vehicle = %vehicle.id, "Greeting from selected vehicle");
        session.profile.recommendation_shown = true;
        return Transition::reply(Node::Recommendation, messages::greeting_selected_vehicle(&vehicle));
    }

    if session.profile.name.is_some() {
        return Transition::cascade(Node::Discovery);
    }

    let mut update = extract(input.utterance, &session.profile);
    let name = update.name.take();
    let has_intent = update.has_vehicle_intent() || session.profile.can_recommend();
    session.profile.merge(update);

    let Some(name) = name else {
        let text = if has_intent {
            messages::greeting_intent_only(&session.profile)
        } else {
            messages::greeting_ask_name()
        };
        return Transition::reply(Node::Greeting, text);
    };

    session.profile.name = Some(name);
    let profile = &session.profile;
    let first_name = profile.first_name().unwrap_or_default();
    let text = if has_intent {
        messages::greeting_with_intent(first_name, profile.body_type, profile.budget)
    } else {
        messages::greeting_name_only(first_name)
    };
    Transition::reply(Node::Discovery, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::test_support::{input, said};
    use sales_agent_core::BodyType;

    fn greet(session: &mut ConversationSession, text: &str) -> Transition {
        let turn = said(text);
        handle(session, &input(&turn, true))
    }

    #[test]
    fn test_plain_greeting_asks_for_name() {
        let mut session = ConversationSession::new("s1");
        let transition = greet(&mut session, "Olá");
        assert_eq!(transition.next, Node::Greeting);
        assert!(transition.reply.unwrap().contains("qual é o seu nome?"));
    }

    #[test]
    fn test_name_moves_to_discovery() {
        let mut session = ConversationSession::new("s1");
        let transition = greet(&mut session, "Oi, sou Maria");
        assert_eq!(transition.next, Node::Discovery);
        assert!(transition.reply.unwrap().contains("Maria"));
        assert_eq!(session.profile.name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_intent_without_name_is_kept() {
        let mut session = ConversationSession::new("s1");
        let transition = greet(&mut session, "quero um SUV");
        assert_eq!(transition.next, Node::Greeting);
        assert!(transition.reply.unwrap().contains("*SUV*"));
        assert_eq!(session.profile.body_type, Some(BodyType::Suv));

        let transition = greet(&mut session, "Carlos");
        assert_eq!(transition.next, Node::Discovery);
        let reply = transition.reply.unwrap();
        assert!(reply.contains("Olá, Carlos!"));
        assert!(reply.contains("Vou buscar as melhores opções"));
    }

    #[test]
    fn test_budget_and_body_without_name_asks_for_name() {
        let mut session = ConversationSession::new("s1");
        let transition = greet(&mut session, "Quero um sedan até 100 mil");
        assert_eq!(transition.next, Node::Greeting);
        let reply = transition.reply.unwrap();
        assert!(reply.contains("*SEDAN*"));
        assert!(reply.contains("Qual é o seu nome?"));
        assert_eq!(session.profile.body_type, Some(BodyType::Sedan));
        assert_eq!(session.profile.budget, Some(100_000));
        assert!(session.profile.name.is_none());
    }

    #[test]
    fn test_known_name_cascades() {
        let mut session = ConversationSession::new("s1");
        session.profile.name = Some("Ana".into());
        assert_eq!(greet(&mut session, "oi"), Transition::cascade(Node::Discovery));
    }
}
