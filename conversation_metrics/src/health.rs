//! Health classification from semantic convergence and drift.

use serde::{Deserialize, Serialize};

use crate::config::HealthThresholds;

/// Overall dialogue health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Stagnant,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
            HealthStatus::Stagnant => "stagnant",
        };
        f.write_str(name)
    }
}

/// Advisory actions for whoever drives the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Nodes sound too alike.
    InjectDiversity,
    /// Content has stopped moving in a long dialogue.
    IntroduceNewTopic,
    /// Nodes have drifted apart and away from earlier content.
    CheckCoherence,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Recommendation::InjectDiversity => {
                "High convergence detected - consider injecting diversity (new perspectives, contrarian prompts)"
            }
            Recommendation::IntroduceNewTopic => {
                "Low semantic drift - consider introducing a new topic or external event"
            }
            Recommendation::CheckCoherence => {
                "Low convergence with high drift - check coherence, nodes may be talking past each other"
            }
        };
        f.write_str(text)
    }
}

/// A freshly computed health verdict. Never stored by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub semantic_convergence: f64,
    pub semantic_drift: f64,
    pub status: HealthStatus,
    pub recommendations: Vec<Recommendation>,
}

impl HealthAssessment {
    /// Recommendations rendered as advisory strings, in evaluation order.
    pub fn recommendation_messages(&self) -> Vec<String> {
        self.recommendations.iter().map(|r| r.to_string()).collect()
    }
}

/// Stateless classifier: the same inputs always give the same verdict.
#[derive(Debug, Clone, Default)]
pub struct HealthClassifier {
    thresholds: HealthThresholds,
}

impl HealthClassifier {
    /// Create a new classifier with the given thresholds.
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    /// Status by first match: critical, warning, stagnant, healthy.
    pub fn status(&self, convergence: f64, drift: f64, turn_count: usize) -> HealthStatus {
        let t = &self.thresholds;
        if convergence > t.critical_convergence {
            HealthStatus::Critical
        } else if convergence > t.warning_convergence {
            HealthStatus::Warning
        } else if self.is_stagnant(drift, turn_count) {
            HealthStatus::Stagnant
        } else {
            HealthStatus::Healthy
        }
    }

    /// Recommendations are checked independently of each other and of the
    /// status.
    pub fn recommendations(&self, convergence: f64, drift: f64, turn_count: usize) -> Vec<Recommendation> {
        let t = &self.thresholds;
        let mut recommendations = Vec::new();
        if convergence > t.warning_convergence {
            recommendations.push(Recommendation::InjectDiversity);
        }
        if self.is_stagnant(drift, turn_count) {
            recommendations.push(Recommendation::IntroduceNewTopic);
        }
        if convergence < t.divergent_convergence && drift > t.divergent_drift {
            recommendations.push(Recommendation::CheckCoherence);
        }
        recommendations
    }

    /// Full assessment: status plus recommendations.
    pub fn classify(&self, convergence: f64, drift: f64, turn_count: usize) -> HealthAssessment {
        HealthAssessment {
            semantic_convergence: convergence,
            semantic_drift: drift,
            status: self.status(convergence, drift, turn_count),
            recommendations: self.recommendations(convergence, drift, turn_count),
        }
    }

    fn is_stagnant(&self, drift: f64, turn_count: usize) -> bool {
        drift < self.thresholds.stagnant_drift && turn_count > self.thresholds.stagnant_min_turns
    }
}
