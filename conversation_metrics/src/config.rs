//! Engine configuration, loadable from TOML.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! [cache]
//! max_entries = 500
//!
//! [references]
//! node_markers = ["Node A", "Node B"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Top-level configuration for the metrics engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub windows: WindowConfig,
    pub cache: CacheConfig,
    pub references: ReferenceConfig,
    pub novelty: NoveltyConfig,
    pub patterns: PatternConfig,
    pub health: HealthThresholds,
}

impl MetricsConfig {
    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: MetricsConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject settings that would break the cache or window contracts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        if self.cache.eviction_batch == 0 {
            return Err(ConfigError::Invalid(
                "cache.eviction_batch must be at least 1".to_string(),
            ));
        }
        if self.novelty.ngram_size == 0 {
            return Err(ConfigError::Invalid(
                "novelty.ngram_size must be at least 1".to_string(),
            ));
        }
        if self.windows.trend == 0 {
            return Err(ConfigError::Invalid(
                "windows.trend must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Window sizes (in turns or snapshots) used by each metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window for diversity, reference rates, coherence and convergence index.
    pub lexical: usize,
    pub topic_drift: usize,
    pub growth: usize,
    pub semantic_convergence: usize,
    pub semantic_drift: usize,
    /// How many recent turns form the centroid for turn novelty.
    pub novelty_history: usize,
    /// Number of snapshots a trend is fitted over.
    pub trend: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lexical: 20,
            topic_drift: 50,
            growth: 100,
            semantic_convergence: 20,
            semantic_drift: 50,
            novelty_history: 50,
            trend: 20,
        }
    }
}

/// Embedding cache bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    /// How many of the oldest entries are dropped once `max_entries` is exceeded.
    pub eviction_batch: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            eviction_batch: 200,
        }
    }
}

/// Terms counted as self- or other-references.
///
/// Matching is case-insensitive and on word boundaries. `node_markers` are
/// literal participant names and count toward the other-reference rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub self_terms: Vec<String>,
    pub other_terms: Vec<String>,
    pub node_markers: Vec<String>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            self_terms: ["i", "me", "my", "mine", "myself"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            other_terms: ["you", "your", "yours", "yourself"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            node_markers: Vec::new(),
        }
    }
}

/// N-gram novelty detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoveltyConfig {
    pub ngram_size: usize,
    pub min_turns: usize,
    pub recent: usize,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            ngram_size: 4,
            min_turns: 100,
            recent: 20,
        }
    }
}

/// Callback detection windows.
///
/// The earlier window is everything except the last `recent + gap` turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub min_turns: usize,
    pub recent: usize,
    pub gap: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_turns: 50,
            recent: 20,
            gap: 20,
        }
    }
}

/// Thresholds for the health classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub critical_convergence: f64,
    pub warning_convergence: f64,
    pub stagnant_drift: f64,
    pub stagnant_min_turns: usize,
    pub divergent_convergence: f64,
    pub divergent_drift: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            critical_convergence: 0.9,
            warning_convergence: 0.8,
            stagnant_drift: 0.1,
            stagnant_min_turns: 100,
            divergent_convergence: 0.3,
            divergent_drift: 0.7,
        }
    }
}
