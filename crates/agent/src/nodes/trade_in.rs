use sales_agent_core::{ConversationSession, Node};
use sales_agent_tools::TradeInVehicle;

use super::{NodeContext, Transition, TurnInput};
use crate::extractor::extract_trade_in;
use crate::intents;
use crate::messages;

pub(crate) fn handle(
    session: &mut ConversationSession,
    input: &TurnInput<'_>,
    ctx: &NodeContext<'_>,
) -> Transition {
    if input.fresh {
        if intents::BACK.matches(input.lower) {
            return Transition::cascade(Node::Recommendation);
        }
        if intents::CLOSE_TRADE_IN.matches(input.lower) {
            return Transition::cascade(Node::Negotiation);
        }
    }

    extract_trade_in(input.utterance).merge_into(&mut session.profile.trade_in);
    let trade_in = &session.profile.trade_in;

    let (Some(brand), Some(year)) = (trade_in.brand.clone(), trade_in.year) else {
        let text = messages::trade_in_missing(
            trade_in.brand.is_some(),
            trade_in.model.is_some(),
            trade_in.year.is_some(),
        );
        return Transition::reply(Node::TradeIn, text);
    };

    let vehicle = TradeInVehicle {
        brand,
        model: trade_in.model.clone(),
        year,
        mileage: trade_in.mileage,
    };
    let estimate = ctx.trade_in.estimate(&vehicle, ctx.current_year);
    let text = messages::trade_in_estimate(&vehicle.brand, vehicle.model.as_deref(), year, &estimate);

    session.profile.trade_in.estimated_value = Some(estimate.midpoint());
    session.metadata.add_flag("trade_in_evaluated");
    Transition::reply(Node::TradeIn, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::test_support::{input, said, Fixture};

    fn evaluate(session: &mut ConversationSession, text: &str, fresh: bool) -> Transition {
        let fixture = Fixture::new();
        let turn = said(text);
        handle(session, &input(&turn, fresh), &fixture.context())
    }

    #[test]
    fn test_missing_fields_are_requested() {
        let mut session = ConversationSession::new("s1");
        let reply = evaluate(&mut session, "tenho um carro pra dar na troca", false)
            .reply
            .unwrap();
        assert!(reply.contains("*marca*"));
        assert!(reply.contains("*ano*"));
        assert!(session.profile.trade_in.has_trade_in);
        assert!(!session.metadata.has_flag("trade_in_evaluated"));
    }

    #[test]
    fn test_estimate_once_brand_and_year_known() {
        let mut session = ConversationSession::new("s1");
        evaluate(&mut session, "é um Onix", true);

        let reply = evaluate(&mut session, "2020", true).reply.unwrap();
        assert!(reply.contains("Avaliação do seu CHEVROLET ONIX 2020"));
        assert!(reply.contains("_Confiança: alta_"));
        assert!(session.metadata.has_flag("trade_in_evaluated"));
        assert!(session.profile.trade_in.estimated_value.is_some());
    }

    #[test]
    fn test_navigation() {
        let mut session = ConversationSession::new("s1");
        assert_eq!(
            evaluate(&mut session, "prefiro avaliar presencial", true),
            Transition::cascade(Node::Negotiation)
        );
        assert_eq!(
            evaluate(&mut session, "voltar", true),
            Transition::cascade(Node::Recommendation)
        );
    }
}
