//! N-gram novelty detection - counts word sequences the recent turns
//! introduce that never appeared earlier in the log.

use std::collections::HashSet;

use dialogue_log::Turn;

use crate::config::NoveltyConfig;
use crate::text::tokenize;

/// Detects novel multi-word sequences in the most recent turns.
#[derive(Debug, Clone, Default)]
pub struct NgramNoveltyDetector {
    config: NoveltyConfig,
}

impl NgramNoveltyDetector {
    /// Create a new detector with the given n-gram settings.
    pub fn new(config: NoveltyConfig) -> Self {
        Self { config }
    }

    /// Number of distinct recent n-grams (size from config) absent from the
    /// earlier turns.
    pub fn count_novel_ngrams(&self, log: &[Turn]) -> usize {
        self.count_novel_ngrams_of_size(log, self.config.ngram_size)
    }

    /// Number of distinct n-grams in the last `recent` turns that never
    /// occur in the rest of the log. Returns 0 for logs shorter than
    /// `min_turns`.
    pub fn count_novel_ngrams_of_size(&self, log: &[Turn], n: usize) -> usize {
        if log.len() < self.config.min_turns || n == 0 {
            return 0;
        }
        let split = log.len().saturating_sub(self.config.recent);
        let (earlier, recent) = log.split_at(split);

        let earlier_ngrams = ngram_set(earlier, n);
        ngram_set(recent, n)
            .iter()
            .filter(|gram| !earlier_ngrams.contains(*gram))
            .count()
    }
}

/// Distinct n-grams across turns. N-grams never span two turns.
pub fn ngram_set(turns: &[Turn], n: usize) -> HashSet<Vec<String>> {
    let mut grams = HashSet::new();
    if n == 0 {
        return grams;
    }
    for turn in turns {
        let tokens = tokenize(&turn.action_text);
        for window in tokens.windows(n) {
            grams.insert(window.to_vec());
        }
    }
    grams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler_log(len: usize) -> Vec<Turn> {
        (0..len)
            .map(|i| {
                let node = if i % 2 == 0 { "node_a" } else { "node_b" };
                Turn::new(i as u64, node, "the watch continues along the wall")
            })
            .collect()
    }

    #[test]
    fn test_short_log_returns_zero() {
        let detector = NgramNoveltyDetector::default();
        assert_eq!(detector.count_novel_ngrams(&filler_log(99)), 0);
    }

    #[test]
    fn test_repeated_text_has_no_novelty() {
        let detector = NgramNoveltyDetector::default();
        assert_eq!(detector.count_novel_ngrams(&filler_log(120)), 0);
    }

    #[test]
    fn test_exact_count_of_new_sequences() {
        let detector = NgramNoveltyDetector::default();
        let mut log = filler_log(100);

        // Five tokens give two new 4-grams; repeating the turn adds nothing.
        log[85].action_text = "silver birds cross midnight".to_string();
        log[90].action_text = "silver birds cross midnight skies".to_string();
        log[95].action_text = "silver birds cross midnight skies".to_string();

        assert_eq!(detector.count_novel_ngrams(&log), 2);
    }

    #[test]
    fn test_earlier_sequences_are_not_novel() {
        let detector = NgramNoveltyDetector::default();
        let mut log = filler_log(100);

        log[10].action_text = "silver birds cross midnight".to_string();
        log[90].action_text = "silver birds cross midnight".to_string();

        assert_eq!(detector.count_novel_ngrams(&log), 0);
    }

    #[test]
    fn test_ngram_set_does_not_span_turns() {
        let turns = vec![Turn::new(1, "a", "one two"), Turn::new(2, "b", "three four")];

        assert!(ngram_set(&turns, 3).is_empty());
        assert_eq!(ngram_set(&turns, 2).len(), 2);
    }
}
