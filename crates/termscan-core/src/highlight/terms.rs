//! Built-in key terms and their compiled whole-word patterns.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Key terms highlighted when the toggle is on, in application order.
pub const KEY_TERMS: [&str; 11] = [
    "breach",
    "dispute",
    "litigation",
    "covenant",
    "bad debts",
    "impaired",
    "impairment",
    "write off",
    "qualified",
    "adverse",
    "disclaimer of opinion",
];

lazy_static! {
    /// Case-insensitive whole-word pattern per key term, same order as `KEY_TERMS`.
    ///
    /// Word boundaries anchor only the ends of the term, so multi-word terms
    /// match as one phrase including their inner spaces. Boundaries are ASCII:
    /// only `[0-9A-Za-z_]` count as word characters.
    pub static ref KEY_TERM_PATTERNS: Vec<(&'static str, Regex)> = KEY_TERMS
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(term));
            (*term, Regex::new(&pattern).unwrap())
        })
        .collect();
}

/// Occurrence counts of each key term in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyTermHits {
    counts: Vec<(&'static str, usize)>,
}

impl KeyTermHits {
    /// Count for one term, 0 when the term is not a key term.
    pub fn count(&self, term: &str) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| *t == term)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Total occurrences over all key terms.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Counts in declaration order, including zeros.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().copied()
    }

    /// Add the counts of another text.
    pub fn merge(&mut self, other: &KeyTermHits) {
        for ((_, mine), (_, theirs)) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }
}

impl Default for KeyTermHits {
    fn default() -> Self {
        Self {
            counts: KEY_TERMS.iter().map(|t| (*t, 0)).collect(),
        }
    }
}

/// Count whole-word key-term occurrences, each term scanned independently.
pub fn count_key_terms(text: &str) -> KeyTermHits {
    KeyTermHits {
        counts: KEY_TERM_PATTERNS
            .iter()
            .map(|(term, pattern)| (*term, pattern.find_iter(text).count()))
            .collect(),
    }
}
