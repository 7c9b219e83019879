//! Conversation session state and dialogue nodes

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::profile::CustomerProfile;
use crate::vehicle::VehicleRecommendation;

/// Dialogue nodes of the sales flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    #[default]
    Greeting,
    Discovery,
    Search,
    Recommendation,
    Financing,
    TradeIn,
    Negotiation,
    Handoff,
    End,
}

impl Node {
    pub const ALL: [Node; 9] = [
        Node::Greeting,
        Node::Discovery,
        Node::Search,
        Node::Recommendation,
        Node::Financing,
        Node::TradeIn,
        Node::Negotiation,
        Node::Handoff,
        Node::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Greeting => "greeting",
            Node::Discovery => "discovery",
            Node::Search => "search",
            Node::Recommendation => "recommendation",
            Node::Financing => "financing",
            Node::TradeIn => "trade_in",
            Node::Negotiation => "negotiation",
            Node::Handoff => "handoff",
            Node::End => "end",
        }
    }

    /// Terminal nodes never route onward within a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Handoff | Node::End)
    }

    /// Resolve a stored node name. Unknown names fall back to `Greeting`.
    pub fn from_name(name: &str) -> Node {
        match Node::ALL.iter().find(|n| n.as_str() == name) {
            Some(node) => *node,
            None => {
                tracing::warn!(node = name, "Unknown node, defaulting to greeting");
                Node::Greeting
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Node::from_name(&name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Bookkeeping attached to every session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub loop_count: u32,
    pub error_count: u32,
    /// Accumulating markers such as `handoff_requested` or `no_results`
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl SessionMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            last_activity_at: now,
            loop_count: 0,
            error_count: 0,
            flags: BTreeSet::new(),
            user_id: None,
        }
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// One continuous conversation with a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub messages: Vec<ConversationMessage>,
    pub profile: CustomerProfile,
    pub recommendations: Vec<VehicleRecommendation>,
    pub metadata: SessionMetadata,
    pub node: Node,
}

impl ConversationSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            profile: CustomerProfile::default(),
            recommendations: Vec::new(),
            metadata: SessionMetadata::new(),
            node: Node::Greeting,
        }
    }

    pub fn push_human(&mut self, content: impl Into<String>) {
        self.push(MessageRole::Human, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(MessageRole::Assistant, content.into());
    }

    fn push(&mut self, role: MessageRole, content: String) {
        self.messages.push(ConversationMessage {
            role,
            content,
            timestamp: Utc::now(),
        });
        self.metadata.touch();
    }

    pub fn last_message(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Most recent customer utterance
    pub fn last_utterance(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Human)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_names_round_trip() {
        for node in Node::ALL {
            assert_eq!(Node::from_name(node.as_str()), node);
        }
    }

    #[test]
    fn test_unknown_node_defaults_to_greeting() {
        assert_eq!(Node::from_name("checkout"), Node::Greeting);

        let node: Node = serde_json::from_str("\"quiz\"").unwrap();
        assert_eq!(node, Node::Greeting);
    }

    #[test]
    fn test_terminal_nodes() {
        assert!(Node::Handoff.is_terminal());
        assert!(Node::End.is_terminal());
        assert!(!Node::Negotiation.is_terminal());
    }

    #[test]
    fn test_session_messages_append() {
        let mut session = ConversationSession::new("s1");
        session.push_human("Olá");
        session.push_assistant("Oi! Qual é o seu nome?");
        session.push_human("Maria");

        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.last_utterance(), Some("Maria"));
        assert_eq!(session.node, Node::Greeting);
    }

    #[test]
    fn test_flags_accumulate() {
        let mut meta = SessionMetadata::new();
        meta.add_flag("no_results");
        meta.add_flag("no_results");
        meta.add_flag("handoff_requested");
        assert_eq!(meta.flags.len(), 2);
        assert!(meta.has_flag("handoff_requested"));
    }
}
