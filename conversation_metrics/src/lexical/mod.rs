//! Lexical metrics - pure computations over a window of turns.
//!
//! All functions here are total: short windows and empty denominators
//! resolve to fixed sentinel values rather than errors.
//!
//! | condition                  | result                                   |
//! |----------------------------|------------------------------------------|
//! | empty window               | diversity = 1.0, coherence = 1.0, else 0 |
//! | zero denominator           | 0.0                                      |
//! | log shorter than growth    | growth = 1.0                             |
//! | fewer than 10 turns        | topic drift = 0.0                        |

mod references;

pub use references::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use dialogue_log::{distinct_nodes, NodeId, Turn};

use crate::config::ReferenceConfig;
use crate::error::ConfigError;
use crate::text::{content_words, jaccard, token_set, tokenize};

/// Minimum window size for topic drift.
pub const MIN_TOPIC_DRIFT_TURNS: usize = 10;

/// Convergence index between one pair of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairConvergence {
    pub first: NodeId,
    pub second: NodeId,
    pub value: f64,
}

/// Windowed lexical measures.
#[derive(Debug, Clone)]
pub struct LexicalMetrics {
    references: ReferenceMatcher,
}

impl LexicalMetrics {
    /// Create lexical metrics with the given reference vocabulary.
    pub fn new(references: &ReferenceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            references: ReferenceMatcher::new(references)?,
        })
    }

    /// Create lexical metrics with the default reference vocabulary.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(&ReferenceConfig::default())
    }

    /// Type-token ratio over the whole window.
    pub fn vocabulary_diversity(&self, window: &[Turn]) -> f64 {
        let tokens: Vec<String> = window
            .iter()
            .flat_map(|t| tokenize(&t.action_text))
            .collect();
        if tokens.is_empty() {
            return 1.0;
        }
        let unique: HashSet<&String> = tokens.iter().collect();
        unique.len() as f64 / tokens.len() as f64
    }

    /// Share of the second half's vocabulary that the first half never used.
    ///
    /// Looks at the last `window` turns of the log. Returns 1.0 when the log
    /// is shorter than `window`.
    pub fn vocabulary_growth(&self, log: &[Turn], window: usize) -> f64 {
        if log.len() < window {
            return 1.0;
        }
        let recent = &log[log.len() - window..];
        let (first, second) = recent.split_at(window / 2);

        let earlier = token_set(first);
        let later = token_set(second);
        let new_tokens = later.difference(&earlier).count();

        new_tokens as f64 / later.len().max(1) as f64
    }

    /// Self-reference matches per token.
    pub fn self_reference_rate(&self, window: &[Turn]) -> f64 {
        self.reference_rate(window, |text| self.references.count_self(text))
    }

    /// Other-reference matches (pronouns and node markers) per token.
    pub fn other_reference_rate(&self, window: &[Turn]) -> f64 {
        self.reference_rate(window, |text| self.references.count_other(text))
    }

    fn reference_rate(&self, window: &[Turn], count: impl Fn(&str) -> usize) -> f64 {
        let mut total_tokens = 0usize;
        let mut matches = 0usize;
        for turn in window {
            total_tokens += turn.action_text.split_whitespace().count();
            matches += count(&turn.action_text);
        }
        if total_tokens == 0 {
            return 0.0;
        }
        matches as f64 / total_tokens as f64
    }

    /// Jaccard distance between the content words of the first and last
    /// quarter of the window.
    pub fn topic_drift(&self, window: &[Turn]) -> f64 {
        if window.len() < MIN_TOPIC_DRIFT_TURNS {
            return 0.0;
        }
        let quarter = window.len() / 4;
        let early = content_words(&window[..quarter]);
        let late = content_words(&window[window.len() - quarter..]);

        if early.is_empty() && late.is_empty() {
            return 0.0;
        }
        1.0 - jaccard(&early, &late)
    }

    /// Mean token-set Jaccard similarity of adjacent turns.
    pub fn coherence(&self, window: &[Turn]) -> f64 {
        if window.len() < 2 {
            return 1.0;
        }
        let sets: Vec<HashSet<String>> = window
            .iter()
            .map(|t| tokenize(&t.action_text).into_iter().collect())
            .collect();

        let total: f64 = sets.windows(2).map(|pair| jaccard(&pair[0], &pair[1])).sum();
        total / (sets.len() - 1) as f64
    }

    /// Vocabulary overlap between the first two nodes to speak in the window.
    ///
    /// Returns 0.0 when fewer than two nodes are present. Other nodes are
    /// ignored; use [`Self::convergence_matrix`] to cover every pair.
    pub fn convergence_index(&self, window: &[Turn]) -> f64 {
        let nodes = distinct_nodes(window);
        match (nodes.first(), nodes.get(1)) {
            (Some(first), Some(second)) => self.convergence_between(window, first, second),
            _ => 0.0,
        }
    }

    /// Jaccard similarity of the token sets used by two specific nodes.
    pub fn convergence_between(&self, window: &[Turn], first: &NodeId, second: &NodeId) -> f64 {
        let first_tokens = token_set(window.iter().filter(|t| t.is_from(first)));
        let second_tokens = token_set(window.iter().filter(|t| t.is_from(second)));

        if first_tokens.is_empty() || second_tokens.is_empty() {
            return 0.0;
        }
        jaccard(&first_tokens, &second_tokens)
    }

    /// Convergence index for every pair of nodes, in first-appearance order.
    pub fn convergence_matrix(&self, window: &[Turn]) -> Vec<PairConvergence> {
        let nodes = distinct_nodes(window);
        let mut pairs = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                pairs.push(PairConvergence {
                    first: nodes[i].clone(),
                    second: nodes[j].clone(),
                    value: self.convergence_between(window, &nodes[i], &nodes[j]),
                });
            }
        }
        pairs
    }
}
