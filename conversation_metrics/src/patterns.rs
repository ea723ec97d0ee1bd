//! Callback detection - recent turns quoting phrases from much earlier in
//! the dialogue.
//!
//! Only verbatim quoted callbacks are detected. Looser ritual or
//! sequence-alignment patterns are out of reach of a substring check and are
//! not attempted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use dialogue_log::{NodeId, Turn};

use crate::config::PatternConfig;
use crate::text::concat_text;

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"|“([^”]+)”"#).expect("quoted phrase pattern is valid")
});

/// A recent turn that quotes a phrase found in the earlier dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackFinding {
    pub sequence_number: u64,
    pub node_id: NodeId,
    pub phrase: String,
}

impl std::fmt::Display for CallbackFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Callback detected: \"{}\" (turn {}, {})",
            self.phrase, self.sequence_number, self.node_id
        )
    }
}

/// Finds quoted callbacks to earlier turns.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: PatternConfig,
}

impl PatternDetector {
    /// Create a new detector with the given window offsets.
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// Scan the last `recent` turns for quoted phrases that occur
    /// (case-insensitively) in everything before the last `recent + gap`
    /// turns. Logs shorter than `min_turns` yield nothing.
    pub fn detect_emergent_patterns(&self, log: &[Turn]) -> Vec<CallbackFinding> {
        if log.len() < self.config.min_turns {
            return Vec::new();
        }
        let recent_start = log.len().saturating_sub(self.config.recent);
        let earlier_end = log
            .len()
            .saturating_sub(self.config.recent.saturating_add(self.config.gap));

        let earlier_text = concat_text(&log[..earlier_end]).to_lowercase();
        if earlier_text.is_empty() {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for turn in &log[recent_start..] {
            for phrase in quoted_phrases(&turn.action_text) {
                if earlier_text.contains(&phrase.to_lowercase()) {
                    findings.push(CallbackFinding {
                        sequence_number: turn.sequence_number,
                        node_id: turn.node_id.clone(),
                        phrase,
                    });
                }
            }
        }
        findings
    }
}

/// Non-blank substrings enclosed in straight or curly double quotes.
pub fn quoted_phrases(text: &str) -> Vec<String> {
    QUOTED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|phrase| !phrase.is_empty())
        .collect()
}
