//! Trend classification over a history of snapshots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Slopes smaller than this in magnitude count as flat.
pub const STABLE_SLOPE: f64 = 0.001;

/// Direction of a metric over recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        };
        f.write_str(name)
    }
}

/// Anything a named metric value can be read from.
///
/// History is persisted by the caller, so entries may be full snapshots or
/// sparse maps deserialised from storage.
pub trait MetricSource {
    fn metric(&self, name: &str) -> Option<f64>;
}

impl MetricSource for BTreeMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl MetricSource for HashMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl MetricSource for serde_json::Map<String, serde_json::Value> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_f64())
    }
}

/// Fits a least-squares line through the most recent values of a metric.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    window: usize,
}

impl TrendAnalyzer {
    /// Create a new analyzer over the last `window` entries.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Number of history entries the slope is fitted over.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Classify the named metric over the last `window` entries.
    ///
    /// Entries missing the metric read as 0.0.
    pub fn metrics_trend<S: MetricSource>(&self, history: &[S], metric_name: &str) -> Trend {
        if self.window == 0 || history.len() < self.window {
            return Trend::InsufficientData;
        }
        let values: Vec<f64> = history[history.len() - self.window..]
            .iter()
            .map(|entry| entry.metric(metric_name).unwrap_or(0.0))
            .collect();

        classify_slope(ols_slope(&values))
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Ordinary least-squares slope of `values` against x = 1..=n.
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let x_mean = (n + 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = (i + 1) as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

fn classify_slope(slope: f64) -> Trend {
    if slope.abs() < STABLE_SLOPE {
        Trend::Stable
    } else if slope > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(values: &[f64]) -> Vec<BTreeMap<String, f64>> {
        values
            .iter()
            .map(|v| BTreeMap::from([("coherence_score".to_string(), *v)]))
            .collect()
    }

    #[test]
    fn test_increasing() {
        let values: Vec<f64> = (0..20).map(|i| i as f64 * 0.01).collect();
        let trend = TrendAnalyzer::default().metrics_trend(&history(&values), "coherence_score");

        assert_eq!(trend, Trend::Increasing);
    }

    #[test]
    fn test_decreasing() {
        let values: Vec<f64> = (0..25).map(|i| 1.0 - i as f64 * 0.02).collect();
        let trend = TrendAnalyzer::default().metrics_trend(&history(&values), "coherence_score");

        assert_eq!(trend, Trend::Decreasing);
    }

    #[test]
    fn test_constant_is_stable() {
        let trend = TrendAnalyzer::default().metrics_trend(&history(&[0.4; 20]), "coherence_score");
        assert_eq!(trend, Trend::Stable);
    }

    #[test]
    fn test_short_history() {
        let trend = TrendAnalyzer::default().metrics_trend(&history(&[0.4; 19]), "coherence_score");
        assert_eq!(trend, Trend::InsufficientData);
        assert_eq!(trend.to_string(), "insufficient_data");
    }

    #[test]
    fn test_missing_field_reads_as_zero() {
        let trend = TrendAnalyzer::default().metrics_trend(&history(&[0.4; 20]), "no_such_metric");
        assert_eq!(trend, Trend::Stable);
    }

    #[test]
    fn test_only_last_window_counts() {
        // A long decline followed by a flat tail.
        let mut values: Vec<f64> = (0..30).map(|i| 1.0 - i as f64 * 0.03).collect();
        values.extend(std::iter::repeat(0.1).take(20));

        let trend = TrendAnalyzer::default().metrics_trend(&history(&values), "coherence_score");
        assert_eq!(trend, Trend::Stable);
    }

    #[test]
    fn test_json_history() {
        let entries: Vec<serde_json::Map<String, serde_json::Value>> = (0..5)
            .map(|i| {
                let mut map = serde_json::Map::new();
                map.insert("topic_drift".to_string(), serde_json::json!(i as f64 * 0.1));
                map
            })
            .collect();

        let trend = TrendAnalyzer::new(5).metrics_trend(&entries, "topic_drift");
        assert_eq!(trend, Trend::Increasing);
    }

    #[test]
    fn test_ols_slope() {
        assert!((ols_slope(&[1.0, 2.0, 3.0, 4.0]) - 1.0).abs() < 1e-12);
        assert_eq!(ols_slope(&[5.0]), 0.0);
    }
}
