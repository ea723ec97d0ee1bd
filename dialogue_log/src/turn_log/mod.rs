//! Turn log - the append-only, ordered record of a dialogue.

use serde::Serialize;
use thiserror::Error;

use crate::turns::{NodeId, Turn};

/// Errors raised while building or loading a turn log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Sequence number {next} does not follow {previous}")]
    NonMonotonic { previous: u64, next: u64 },

    #[error("Invalid turn log JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The complete sequence of turns at the time of a snapshot.
///
/// Sequence numbers are strictly increasing. Nothing in this type allows a
/// turn to be edited or removed once appended.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TurnLog {
    turns: Vec<Turn>,
}

impl TurnLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from turns, validating their ordering.
    pub fn from_turns(turns: impl IntoIterator<Item = Turn>) -> Result<Self, LogError> {
        let mut log = Self::new();
        for turn in turns {
            log.append(turn)?;
        }
        Ok(log)
    }

    /// Parse a log from a JSON array of turns.
    pub fn from_json(json: &str) -> Result<Self, LogError> {
        let turns: Vec<Turn> = serde_json::from_str(json)?;
        Self::from_turns(turns)
    }

    /// Serialize the log as a JSON array of turns.
    pub fn to_json(&self) -> Result<String, LogError> {
        Ok(serde_json::to_string(&self.turns)?)
    }

    /// Append a turn to the end of the log.
    pub fn append(&mut self, turn: Turn) -> Result<(), LogError> {
        if let Some(last) = self.turns.last() {
            if turn.sequence_number <= last.sequence_number {
                return Err(LogError::NonMonotonic {
                    previous: last.sequence_number,
                    next: turn.sequence_number,
                });
            }
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Number of turns in the log.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check whether the log holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Borrow every turn in order.
    pub fn as_slice(&self) -> &[Turn] {
        &self.turns
    }

    /// Iterate over turns in order.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The last `n` turns (or the whole log if it is shorter).
    pub fn suffix(&self, n: usize) -> &[Turn] {
        recent_turns(&self.turns, n)
    }

    /// Distinct node IDs in order of first appearance.
    pub fn nodes(&self) -> Vec<NodeId> {
        distinct_nodes(&self.turns)
    }
}

/// The last `n` turns of a slice, or all of it when shorter.
pub fn recent_turns(turns: &[Turn], n: usize) -> &[Turn] {
    &turns[turns.len().saturating_sub(n)..]
}

/// Distinct node IDs of a slice, in order of first appearance.
pub fn distinct_nodes(turns: &[Turn]) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = Vec::new();
    for turn in turns {
        if !nodes.contains(&turn.node_id) {
            nodes.push(turn.node_id.clone());
        }
    }
    nodes
}

impl AsRef<[Turn]> for TurnLog {
    fn as_ref(&self) -> &[Turn] {
        &self.turns
    }
}
