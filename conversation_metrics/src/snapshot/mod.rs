//! Metrics engine - runs every component over a turn log and assembles the
//! results into one snapshot per invocation.
//!
//! The engine works in stages:
//! 1. **Windowing**: take the configured suffix of the log for each metric
//! 2. **Lexical**: diversity, reference rates, drift, coherence, convergence
//! 3. **Novelty**: count new n-grams in the most recent turns
//! 4. **Semantic** (optional): convergence and drift through the embedding cache
//! 5. **Assembly**: build the [`MetricsSnapshot`]
//!
//! Lexical metrics never fail. Semantic metrics can, and their errors reach
//! the caller unchanged so it can fall back to [`MetricsEngine::snapshot`].

mod record;

pub use record::*;

use chrono::Utc;
use tracing::debug;

use dialogue_log::{recent_turns, Turn};

use crate::config::MetricsConfig;
use crate::embedding::EmbeddingCache;
use crate::error::{ConfigError, MetricsResult};
use crate::health::{HealthAssessment, HealthClassifier};
use crate::lexical::LexicalMetrics;
use crate::novelty::NgramNoveltyDetector;
use crate::patterns::{CallbackFinding, PatternDetector};
use crate::semantic::SemanticMetrics;
use crate::trend::{MetricSource, Trend, TrendAnalyzer};

/// Orchestrates every metric component under one configuration.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    config: MetricsConfig,
    lexical: LexicalMetrics,
    novelty: NgramNoveltyDetector,
    patterns: PatternDetector,
    classifier: HealthClassifier,
    trend: TrendAnalyzer,
}

impl MetricsEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: MetricsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            lexical: LexicalMetrics::new(&config.references)?,
            novelty: NgramNoveltyDetector::new(config.novelty.clone()),
            patterns: PatternDetector::new(config.patterns.clone()),
            classifier: HealthClassifier::new(config.health.clone()),
            trend: TrendAnalyzer::new(config.windows.trend),
            config,
        })
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(MetricsConfig::default())
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Get the lexical metrics component.
    pub fn lexical(&self) -> &LexicalMetrics {
        &self.lexical
    }

    /// Build an embedding cache sized by this engine's configuration.
    pub fn build_cache(&self) -> Result<EmbeddingCache, ConfigError> {
        EmbeddingCache::new(self.config.cache.clone())
    }

    /// Compute the lexical-only snapshot. Never fails.
    pub fn snapshot(&self, log: &[Turn]) -> MetricsSnapshot {
        let windows = &self.config.windows;
        let recent = recent_turns(log, windows.lexical);
        let drift_window = recent_turns(log, windows.topic_drift);

        let snapshot = MetricsSnapshot {
            turn_number: log.last().map(|t| t.sequence_number).unwrap_or(0),
            vocabulary_diversity: self.lexical.vocabulary_diversity(recent),
            self_reference_rate: self.lexical.self_reference_rate(recent),
            other_reference_rate: self.lexical.other_reference_rate(recent),
            topic_drift: self.lexical.topic_drift(drift_window),
            coherence_score: self.lexical.coherence(recent),
            convergence_index: self.lexical.convergence_index(recent),
            novel_ngram_count: self.novelty.count_novel_ngrams(log),
            timestamp: Utc::now(),
            vocabulary_growth: (log.len() >= windows.growth)
                .then(|| self.lexical.vocabulary_growth(log, windows.growth)),
            semantic_convergence: None,
            semantic_drift: None,
        };

        debug!(
            turn = snapshot.turn_number,
            turns = log.len(),
            novel_ngrams = snapshot.novel_ngram_count,
            "computed metrics snapshot"
        );
        snapshot
    }

    /// Compute the snapshot including semantic convergence and drift.
    pub fn snapshot_with_semantics(
        &self,
        log: &[Turn],
        semantic: &SemanticMetrics<'_>,
    ) -> MetricsResult<MetricsSnapshot> {
        let windows = &self.config.windows;
        let convergence = semantic.semantic_convergence(log, windows.semantic_convergence)?;
        let drift = semantic.semantic_drift(log, windows.semantic_drift)?;

        let mut snapshot = self.snapshot(log);
        snapshot.semantic_convergence = Some(convergence);
        snapshot.semantic_drift = Some(drift);
        Ok(snapshot)
    }

    /// Classify dialogue health from current semantic measures.
    pub fn assess_health(
        &self,
        log: &[Turn],
        semantic: &SemanticMetrics<'_>,
    ) -> MetricsResult<HealthAssessment> {
        let windows = &self.config.windows;
        let convergence = semantic.semantic_convergence(log, windows.semantic_convergence)?;
        let drift = semantic.semantic_drift(log, windows.semantic_drift)?;

        let assessment = self.classifier.classify(convergence, drift, log.len());
        debug!(
            status = %assessment.status,
            convergence,
            drift,
            recommendations = assessment.recommendations.len(),
            "assessed dialogue health"
        );
        Ok(assessment)
    }

    /// Semantic distance of a candidate turn from recent history.
    pub fn turn_novelty(
        &self,
        log: &[Turn],
        new_text: &str,
        semantic: &SemanticMetrics<'_>,
    ) -> MetricsResult<f64> {
        semantic.turn_novelty(log, new_text, self.config.windows.novelty_history)
    }

    /// Quoted callbacks from recent turns to much earlier ones.
    pub fn detect_patterns(&self, log: &[Turn]) -> Vec<CallbackFinding> {
        self.patterns.detect_emergent_patterns(log)
    }

    /// Direction of a named metric over the caller's snapshot history.
    pub fn metrics_trend<S: MetricSource>(&self, history: &[S], metric_name: &str) -> Trend {
        self.trend.metrics_trend(history, metric_name)
    }
}
