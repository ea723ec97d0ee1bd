//! Precompiled self/other reference matchers.

use regex::Regex;

use crate::config::ReferenceConfig;
use crate::error::ConfigError;

/// Case-insensitive, word-boundary matchers for each reference category.
///
/// Patterns are compiled once from configuration. An empty term list
/// matches nothing.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    self_pattern: Option<Regex>,
    other_pattern: Option<Regex>,
}

impl ReferenceMatcher {
    /// Compile matchers from the configured term lists.
    pub fn new(config: &ReferenceConfig) -> Result<Self, ConfigError> {
        let other_terms: Vec<&String> = config
            .other_terms
            .iter()
            .chain(config.node_markers.iter())
            .collect();

        Ok(Self {
            self_pattern: compile(config.self_terms.iter())?,
            other_pattern: compile(other_terms.into_iter())?,
        })
    }

    /// Count self-references in a text.
    pub fn count_self(&self, text: &str) -> usize {
        count(self.self_pattern.as_ref(), text)
    }

    /// Count references to other participants in a text.
    pub fn count_other(&self, text: &str) -> usize {
        count(self.other_pattern.as_ref(), text)
    }
}

fn compile<'a>(terms: impl Iterator<Item = &'a String>) -> Result<Option<Regex>, ConfigError> {
    let mut terms: Vec<&str> = terms
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return Ok(None);
    }

    // Longest first so multi-word markers win over their prefixes.
    terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    terms.dedup();

    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)\b(?:{})\b", alternation);

    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| ConfigError::Invalid(format!("reference pattern: {}", e)))
}

fn count(pattern: Option<&Regex>, text: &str) -> usize {
    pattern.map(|p| p.find_iter(text).count()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_are_case_insensitive() {
        let matcher = ReferenceMatcher::new(&ReferenceConfig::default()).unwrap();

        assert_eq!(matcher.count_self("I think MY plan is mine"), 3);
        assert_eq!(matcher.count_other("You and YOUR friends"), 2);
    }

    #[test]
    fn test_word_boundaries() {
        let matcher = ReferenceMatcher::new(&ReferenceConfig::default()).unwrap();

        // "mystery" and "youth" must not match "my" / "you"
        assert_eq!(matcher.count_self("a mystery"), 0);
        assert_eq!(matcher.count_other("in our youth"), 0);
    }

    #[test]
    fn test_node_markers_count_as_other() {
        let config = ReferenceConfig {
            node_markers: vec!["Node A".to_string(), "Node B".to_string()],
            ..ReferenceConfig::default()
        };
        let matcher = ReferenceMatcher::new(&config).unwrap();

        assert_eq!(matcher.count_other("node a spoke to NODE B"), 2);
    }

    #[test]
    fn test_empty_terms_match_nothing() {
        let config = ReferenceConfig {
            self_terms: vec![],
            other_terms: vec![],
            node_markers: vec![],
        };
        let matcher = ReferenceMatcher::new(&config).unwrap();

        assert_eq!(matcher.count_self("I me my"), 0);
        assert_eq!(matcher.count_other("you"), 0);
    }
}
