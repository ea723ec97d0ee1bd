//! Tokenization and set helpers shared by the lexical metrics.

use std::collections::HashSet;

use dialogue_log::Turn;

/// Words ignored when extracting content words for topic drift.
///
/// Only entries longer than four characters can matter, since shorter
/// tokens are never content words.
pub const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "almost", "along", "already", "also",
    "although", "always", "among", "another", "anyone", "anything", "around", "because",
    "become", "becomes", "been", "before", "behind", "being", "below", "between", "both",
    "cannot", "could", "doing", "during", "each", "either", "enough", "every", "everything",
    "first", "from", "further", "having", "here", "however", "into", "itself", "just",
    "maybe", "might", "more", "most", "much", "must", "myself", "never", "nothing", "often",
    "once", "only", "other", "others", "ourselves", "over", "perhaps", "quite", "rather",
    "really", "same", "should", "since", "something", "still", "such", "than", "that",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they", "thing",
    "things", "this", "those", "though", "through", "under", "until", "upon", "very",
    "were", "what", "whatever", "when", "where", "whether", "which", "while", "whole",
    "will", "with", "within", "without", "would", "your", "yours", "yourself",
    "yourselves",
];

/// Lowercase a text and split it on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Join the action text of every turn with single spaces.
pub fn concat_text(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| t.action_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Distinct lowercase tokens across all turns.
pub fn token_set<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> HashSet<String> {
    turns
        .into_iter()
        .flat_map(|t| tokenize(&t.action_text))
        .collect()
}

/// Tokens longer than four characters that are not stop words.
pub fn content_words(turns: &[Turn]) -> HashSet<String> {
    turns
        .iter()
        .flat_map(|t| tokenize(&t.action_text))
        .filter(|w| w.chars().count() > 4 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// `|A ∩ B| / |A ∪ B|`, or 0.0 when both sets are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
