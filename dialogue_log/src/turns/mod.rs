//! Turn definitions for the dialogue log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a dialogue participant.
///
/// The set of nodes is open-ended: any string names a node, so a log may
/// hold two participants or twenty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node ID from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the node name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One dialogue contribution by a node.
///
/// Turns are immutable once appended to a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub sequence_number: u64,
    pub node_id: NodeId,
    pub action_text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    pub fn new(
        sequence_number: u64,
        node_id: impl Into<NodeId>,
        action_text: impl Into<String>,
    ) -> Self {
        Self {
            sequence_number,
            node_id: node_id.into(),
            action_text: action_text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Override the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check whether this turn was produced by the given node.
    pub fn is_from(&self, node: &NodeId) -> bool {
        &self.node_id == node
    }
}
