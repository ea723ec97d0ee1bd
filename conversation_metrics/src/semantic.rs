//! Embedding-based convergence, drift and novelty.
//!
//! Every embedding goes through the shared [`EmbeddingCache`]; the cache and
//! provider are borrowed per invocation rather than held globally.

use dialogue_log::{distinct_nodes, NodeId, Turn};

use crate::embedding::{EmbeddingCache, EmbeddingProvider, EmbeddingVector};
use crate::error::{MetricsError, MetricsResult};
use crate::text::concat_text;

/// Minimum log length before turn novelty is measured.
pub const MIN_NOVELTY_HISTORY: usize = 10;

/// Turn novelty reported when there is not enough history to compare with.
pub const NEUTRAL_NOVELTY: f64 = 0.5;

/// Cosine similarity; 0.0 when either vector has zero magnitude or the
/// lengths differ. [`SemanticMetrics`] rejects mismatched lengths before
/// calling this.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut a_norm_sq = 0.0f64;
    let mut b_norm_sq = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        a_norm_sq += x * x;
        b_norm_sq += y * y;
    }
    if a_norm_sq == 0.0 || b_norm_sq == 0.0 {
        return 0.0;
    }
    dot / (a_norm_sq.sqrt() * b_norm_sq.sqrt())
}

/// `1 - cosine_similarity(a, b)`.
pub fn semantic_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Semantic measures backed by a cache and a provider.
pub struct SemanticMetrics<'a> {
    cache: &'a EmbeddingCache,
    provider: &'a dyn EmbeddingProvider,
}

impl<'a> SemanticMetrics<'a> {
    /// Create semantic metrics over a shared cache and the given provider.
    pub fn new(cache: &'a EmbeddingCache, provider: &'a dyn EmbeddingProvider) -> Self {
        Self { cache, provider }
    }

    /// Identifier of the provider that embeddings are computed with.
    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    /// Embed a text through the cache.
    pub fn embed(&self, text: &str) -> MetricsResult<EmbeddingVector> {
        self.cache.get_or_compute(text, self.provider)
    }

    /// Similarity of what the first two nodes said over the last `window`
    /// turns, clamped to `[0, 1]`.
    ///
    /// Returns 0.0 when the log is shorter than `window` or fewer than two
    /// nodes spoke in it.
    pub fn semantic_convergence(&self, log: &[Turn], window: usize) -> MetricsResult<f64> {
        if log.len() < window {
            return Ok(0.0);
        }
        let recent = &log[log.len() - window..];
        let nodes = distinct_nodes(recent);
        match (nodes.first(), nodes.get(1)) {
            (Some(first), Some(second)) => self.convergence_between(recent, first, second),
            _ => Ok(0.0),
        }
    }

    /// Similarity of two specific nodes' concatenated text within a window.
    pub fn convergence_between(
        &self,
        window: &[Turn],
        first: &NodeId,
        second: &NodeId,
    ) -> MetricsResult<f64> {
        let first_texts = node_texts(window, first);
        let second_texts = node_texts(window, second);
        if first_texts.is_empty() || second_texts.is_empty() {
            return Ok(0.0);
        }

        let a = self.embed(&first_texts.join(" "))?;
        let b = self.embed(&second_texts.join(" "))?;
        same_dimensions(&a, &b)?;
        Ok(cosine_similarity(&a, &b).clamp(0.0, 1.0))
    }

    /// Distance between the first and last quarter of the last `window`
    /// turns, clamped to `[0, 1]`.
    pub fn semantic_drift(&self, log: &[Turn], window: usize) -> MetricsResult<f64> {
        if log.len() < window {
            return Ok(0.0);
        }
        let quarter = window / 4;
        if quarter == 0 {
            return Ok(0.0);
        }
        let recent = &log[log.len() - window..];

        let early = self.embed(&concat_text(&recent[..quarter]))?;
        let late = self.embed(&concat_text(&recent[window - quarter..]))?;
        same_dimensions(&early, &late)?;
        Ok(semantic_distance(&early, &late).clamp(0.0, 1.0))
    }

    /// Element-wise mean of per-turn embeddings. Empty input yields an empty
    /// vector, which callers must treat as "no centroid".
    pub fn centroid_embedding(&self, turns: &[Turn]) -> MetricsResult<EmbeddingVector> {
        let mut sum: Vec<f64> = Vec::new();
        for (i, turn) in turns.iter().enumerate() {
            let embedding = self.embed(&turn.action_text)?;
            if i == 0 {
                sum = vec![0.0; embedding.len()];
            } else if embedding.len() != sum.len() {
                return Err(MetricsError::DimensionMismatch {
                    expected: sum.len(),
                    actual: embedding.len(),
                });
            }
            for (acc, value) in sum.iter_mut().zip(embedding.iter()) {
                *acc += *value as f64;
            }
        }

        let count = turns.len().max(1) as f64;
        Ok(sum.into_iter().map(|v| (v / count) as f32).collect())
    }

    /// How far `new_text` sits from the centroid of the last `history` turns.
    ///
    /// Returns [`NEUTRAL_NOVELTY`] when the log has fewer than
    /// [`MIN_NOVELTY_HISTORY`] turns or the centroid is empty.
    pub fn turn_novelty(&self, log: &[Turn], new_text: &str, history: usize) -> MetricsResult<f64> {
        if log.len() < MIN_NOVELTY_HISTORY {
            return Ok(NEUTRAL_NOVELTY);
        }
        let recent = &log[log.len().saturating_sub(history)..];
        let centroid = self.centroid_embedding(recent)?;
        if centroid.is_empty() {
            return Ok(NEUTRAL_NOVELTY);
        }

        let embedding = self.embed(new_text)?;
        same_dimensions(&centroid, &embedding)?;
        Ok(semantic_distance(&embedding, &centroid))
    }
}

/// A provider must return vectors of one fixed length.
fn same_dimensions(expected: &[f32], actual: &[f32]) -> MetricsResult<()> {
    if expected.len() != actual.len() {
        return Err(MetricsError::DimensionMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    Ok(())
}

fn node_texts<'t>(window: &'t [Turn], node: &NodeId) -> Vec<&'t str> {
    window
        .iter()
        .filter(|t| t.is_from(node))
        .map(|t| t.action_text.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::text::tokenize;

    /// One dimension per known word; unknown words are ignored.
    struct KeywordProvider {
        vocabulary: Vec<&'static str>,
    }

    impl KeywordProvider {
        fn new() -> Self {
            Self {
                vocabulary: vec!["fire", "ash", "smoke", "water", "rain", "tide"],
            }
        }
    }

    impl EmbeddingProvider for KeywordProvider {
        fn id(&self) -> &str {
            "keyword"
        }

        fn embed(&self, text: &str) -> MetricsResult<EmbeddingVector> {
            let mut v = vec![0.0; self.vocabulary.len()];
            for token in tokenize(text) {
                if let Some(i) = self.vocabulary.iter().position(|w| *w == token) {
                    v[i] += 1.0;
                }
            }
            Ok(v)
        }
    }

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn id(&self) -> &str {
            "failing"
        }

        fn embed(&self, _text: &str) -> MetricsResult<EmbeddingVector> {
            Err(MetricsError::provider("failing", "quota exceeded"))
        }
    }

    /// One dimension per token, so vector length follows the text.
    struct RaggedProvider;

    impl EmbeddingProvider for RaggedProvider {
        fn id(&self) -> &str {
            "ragged"
        }

        fn embed(&self, text: &str) -> MetricsResult<EmbeddingVector> {
            Ok(vec![1.0; tokenize(text).len()])
        }
    }

    fn alternating(len: usize, a_text: &str, b_text: &str) -> Vec<Turn> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::new(i as u64, "node_a", a_text)
                } else {
                    Turn::new(i as u64, "node_b", b_text)
                }
            })
            .collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
        assert!((semantic_distance(&[2.0, 0.0], &[1.0, 0.0])).abs() < 1e-12);
    }

    #[test]
    fn test_convergence_short_log() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);

        let log = alternating(5, "fire", "fire");
        assert_eq!(semantic.semantic_convergence(&log, 20).unwrap(), 0.0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_convergence_identical_and_disjoint() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);

        let same = alternating(20, "fire and ash", "ash and fire");
        assert!((semantic.semantic_convergence(&same, 20).unwrap() - 1.0).abs() < 1e-9);

        let apart = alternating(20, "fire smoke", "water rain");
        assert_eq!(semantic.semantic_convergence(&apart, 20).unwrap(), 0.0);
    }

    #[test]
    fn test_convergence_symmetric() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);
        let log = alternating(20, "fire fire ash", "ash water tide");
        let (a, b) = (NodeId::from("node_a"), NodeId::from("node_b"));

        assert_eq!(
            semantic.convergence_between(&log, &a, &b).unwrap(),
            semantic.convergence_between(&log, &b, &a).unwrap()
        );
    }

    #[test]
    fn test_convergence_single_node_is_zero() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);
        let log: Vec<Turn> = (0..20).map(|i| Turn::new(i, "solo", "fire")).collect();

        assert_eq!(semantic.semantic_convergence(&log, 20).unwrap(), 0.0);
    }

    #[test]
    fn test_drift() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);

        let steady: Vec<Turn> = (0..50).map(|i| Turn::new(i, "a", "fire ash")).collect();
        assert!(semantic.semantic_drift(&steady, 50).unwrap().abs() < 1e-9);

        let mut shifting = steady.clone();
        for turn in shifting.iter_mut().skip(38) {
            turn.action_text = "water tide".to_string();
        }
        assert!((semantic.semantic_drift(&shifting, 50).unwrap() - 1.0).abs() < 1e-9);

        assert_eq!(semantic.semantic_drift(&steady[..10], 50).unwrap(), 0.0);
    }

    #[test]
    fn test_centroid() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);

        assert!(semantic.centroid_embedding(&[]).unwrap().is_empty());

        let turns = vec![Turn::new(1, "a", "fire"), Turn::new(2, "b", "water")];
        let centroid = semantic.centroid_embedding(&turns).unwrap();
        assert_eq!(centroid, vec![0.5, 0.0, 0.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_turn_novelty() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);

        let short: Vec<Turn> = (0..9).map(|i| Turn::new(i, "a", "fire")).collect();
        assert_eq!(semantic.turn_novelty(&short, "water", 50).unwrap(), NEUTRAL_NOVELTY);

        let log: Vec<Turn> = (0..30).map(|i| Turn::new(i, "a", "fire")).collect();
        assert!(semantic.turn_novelty(&log, "fire", 50).unwrap().abs() < 1e-9);
        assert!((semantic.turn_novelty(&log, "water", 50).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_provider_failure_propagates() {
        let cache = EmbeddingCache::new(CacheConfig::default()).unwrap();
        let semantic = SemanticMetrics::new(&cache, &FailingProvider);
        let log = alternating(20, "fire", "water");

        let err = semantic.semantic_convergence(&log, 20).unwrap_err();
        assert!(matches!(err, MetricsError::ProviderFailure { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_repeated_calls_hit_cache() {
        let cache = EmbeddingCache::with_defaults();
        let provider = KeywordProvider::new();
        let semantic = SemanticMetrics::new(&cache, &provider);
        let log = alternating(20, "fire ash", "ash smoke");

        let first = semantic.semantic_convergence(&log, 20).unwrap();
        let second = semantic.semantic_convergence(&log, 20).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_centroid_dimension_mismatch() {
        let cache = EmbeddingCache::with_defaults();
        let semantic = SemanticMetrics::new(&cache, &RaggedProvider);
        let turns = vec![Turn::new(1, "a", "fire ash"), Turn::new(2, "b", "water rain tide")];

        let err = semantic.centroid_embedding(&turns).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn test_drift_dimension_mismatch() {
        let cache = EmbeddingCache::with_defaults();
        let semantic = SemanticMetrics::new(&cache, &RaggedProvider);
        let mut log: Vec<Turn> = (0..50).map(|i| Turn::new(i, "a", "fire ash")).collect();
        log[49].action_text = "fire ash water rain".to_string();

        let err = semantic.semantic_drift(&log, 50).unwrap_err();
        assert!(matches!(err, MetricsError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_convergence_dimension_mismatch() {
        let cache = EmbeddingCache::with_defaults();
        let semantic = SemanticMetrics::new(&cache, &RaggedProvider);
        let log = alternating(20, "fire ash", "water rain tide");

        let err = semantic.semantic_convergence(&log, 20).unwrap_err();
        assert!(matches!(err, MetricsError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_turn_novelty_dimension_mismatch() {
        let cache = EmbeddingCache::with_defaults();
        let semantic = SemanticMetrics::new(&cache, &RaggedProvider);
        let log: Vec<Turn> = (0..20).map(|i| Turn::new(i, "a", "fire ash")).collect();

        let err = semantic.turn_novelty(&log, "a whole new line", 50).unwrap_err();
        assert!(matches!(err, MetricsError::DimensionMismatch { .. }));
    }
}
