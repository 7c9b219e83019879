use sales_agent_core::{ConversationSession, Node};

use super::{NodeContext, Transition, TurnInput};
use crate::extractor::rules::{Keywords, Patterns};
use crate::intents;
use crate::messages;

// Amount before "entrada" is tried first so a later term ("em 48x") is
// not read as the down payment
static DOWN_PAYMENT: Patterns = Patterns::new(&[
    r"(\d{1,3}(?:\.\d{3})*)[\s.]?(mil|k)?\s*(?:reais\s*)?(?:de\s*)?entrada",
    r"entrada.*?(\d{1,3}(?:\.\d{3})*)[\s.]?(mil|k)?",
]);

static TERM: Keywords = Keywords::new(r"(\d{1,3})\s*(?:meses|mês|mes\b|x\b|vezes|parcelas?)");

fn parse_down_payment(lower: &str) -> Option<u64> {
    DOWN_PAYMENT.iter().find_map(|pattern| {
        let caps = pattern.captures(lower)?;
        let value: u64 = caps.get(1)?.as_str().replace('.', "").parse().ok()?;
        let in_thousands = caps.get(2).is_some() || value < 100;
        if in_thousands {
            value.checked_mul(1000)
        } else {
            Some(value)
        }
    })
}

fn parse_term(lower: &str) -> Option<u32> {
    TERM.capture(lower)
        .and_then(|m| m.parse().ok())
        .filter(|months| *months > 0)
}

pub(crate) fn handle(
    session: &mut ConversationSession,
    input: &TurnInput<'_>,
    ctx: &NodeContext<'_>,
) -> Transition {
    let lower = input.lower;

    if input.fresh {
        if intents::BACK.matches(lower) {
            return Transition::cascade(Node::Recommendation);
        }
        if intents::CLOSE_FINANCING.matches(lower) {
            return Transition::cascade(Node::Negotiation);
        }
    }

    let price = session
        .profile
        .last_shown
        .first()
        .map(|v| v.price)
        .or(session.profile.budget)
        .filter(|price| *price > 0);
    let Some(price) = price else {
        return Transition::reply(Node::Discovery, messages::FINANCING_NO_PRICE);
    };

    let down_payment = parse_down_payment(lower);
    let term = parse_term(lower);
    if input.fresh
        && down_payment.is_none()
        && term.is_none()
        && session.metadata.has_flag("financing_simulated")
    {
        return Transition::reply(Node::Financing, messages::FINANCING_PROMPT);
    }

    let preference = &session.profile.financing;
    let down_payment = down_payment
        .or(preference.down_payment)
        .unwrap_or_else(|| ctx.financing.default_down_payment(price))
        .min(price);
    let term = term
        .or(preference.term_months)
        .unwrap_or_else(|| ctx.financing.default_term_months());

    let (primary, alternatives) = ctx
        .financing
        .simulate_with_alternatives(price, down_payment, term);
    let mut simulations = alternatives;
    simulations.push(primary);
    simulations.sort_by_key(|s| s.term_months);
    simulations.dedup_by_key(|s| s.term_months);

    tracing::debug!(
        session_id = %session.session_id,
        price,
        down_payment,
        term,
        "Financing simulated"
    );

    let financing = &mut session.profile.financing;
    financing.wants_financing = true;
    financing.down_payment = Some(down_payment);
    financing.term_months = Some(term);
    session.metadata.add_flag("financing_simulated");

    Transition::reply(Node::Financing, messages::financing_simulation(&simulations, term))
}
