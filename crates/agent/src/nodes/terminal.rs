use sales_agent_core::Node;

use super::Transition;
use crate::messages;

/// Terminal nodes answer with a closing message and stay put
pub(crate) fn handle(node: Node) -> Transition {
    let text = match node {
        Node::Handoff => messages::HANDOFF_CLOSING,
        _ => messages::END_CLOSING,
    };
    Transition::reply(node, text)
}
