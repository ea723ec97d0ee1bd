//! The point-in-time metrics record handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::trend::MetricSource;

/// Metrics for one invocation. The caller owns and persists the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub turn_number: u64,
    pub vocabulary_diversity: f64,
    pub self_reference_rate: f64,
    pub other_reference_rate: f64,
    pub topic_drift: f64,
    pub coherence_score: f64,
    pub convergence_index: f64,
    pub novel_ngram_count: usize,
    pub timestamp: DateTime<Utc>,

    /// Present once the log covers the growth window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_growth: Option<f64>,

    /// Present when the snapshot was computed with an embedding provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_convergence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_drift: Option<f64>,
}

impl MetricsSnapshot {
    /// Names of every numeric field, in report order.
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "turn_number",
        "vocabulary_diversity",
        "self_reference_rate",
        "other_reference_rate",
        "topic_drift",
        "coherence_score",
        "convergence_index",
        "novel_ngram_count",
        "vocabulary_growth",
        "semantic_convergence",
        "semantic_drift",
    ];

    /// Read a numeric field by name. Absent optional fields and unknown
    /// names give `None`.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "turn_number" => Some(self.turn_number as f64),
            "vocabulary_diversity" => Some(self.vocabulary_diversity),
            "self_reference_rate" => Some(self.self_reference_rate),
            "other_reference_rate" => Some(self.other_reference_rate),
            "topic_drift" => Some(self.topic_drift),
            "coherence_score" => Some(self.coherence_score),
            "convergence_index" => Some(self.convergence_index),
            "novel_ngram_count" => Some(self.novel_ngram_count as f64),
            "vocabulary_growth" => self.vocabulary_growth,
            "semantic_convergence" => self.semantic_convergence,
            "semantic_drift" => self.semantic_drift,
            _ => None,
        }
    }

    /// Sparse `field -> value` map holding only the fields that are set.
    pub fn to_field_map(&self) -> BTreeMap<String, f64> {
        Self::FIELD_NAMES
            .iter()
            .filter_map(|name| self.field(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

impl MetricSource for MetricsSnapshot {
    fn metric(&self, name: &str) -> Option<f64> {
        self.field(name)
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "## Conversation Metrics (turn {})", self.turn_number)?;
        writeln!(f, "Recorded: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "- Vocabulary diversity: {:.3}", self.vocabulary_diversity)?;
        if let Some(growth) = self.vocabulary_growth {
            writeln!(f, "- Vocabulary growth: {:.3}", growth)?;
        }
        writeln!(f, "- Self-reference rate: {:.3}", self.self_reference_rate)?;
        writeln!(f, "- Other-reference rate: {:.3}", self.other_reference_rate)?;
        writeln!(f, "- Topic drift: {:.3}", self.topic_drift)?;
        writeln!(f, "- Coherence: {:.3}", self.coherence_score)?;
        writeln!(f, "- Convergence index: {:.3}", self.convergence_index)?;
        writeln!(f, "- Novel n-grams: {}", self.novel_ngram_count)?;
        if let Some(convergence) = self.semantic_convergence {
            writeln!(f, "- Semantic convergence: {:.3}", convergence)?;
        }
        if let Some(drift) = self.semantic_drift {
            writeln!(f, "- Semantic drift: {:.3}", drift)?;
        }
        Ok(())
    }
}
