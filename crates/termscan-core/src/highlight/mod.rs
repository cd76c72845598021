//! Search-term and key-term highlighting.
//!
//! Highlighting runs two sequential passes over one working copy of the text:
//! first the search term, then every key term in declaration order. The
//! key-term pass scans the output of the search pass, markup included, so a
//! key term inside a search match ends up nested in it, and later key terms
//! may nest inside earlier ones. Output is therefore not idempotent.

mod terms;

pub use terms::{count_key_terms, KeyTermHits, KEY_TERMS, KEY_TERM_PATTERNS};

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::HighlightError;

/// Class of the marker wrapped around search-term matches.
pub const SEARCH_HIGHLIGHT_CLASS: &str = "search-highlight";

/// Class of the marker wrapped around key-term matches.
pub const KEY_TERM_HIGHLIGHT_CLASS: &str = "key-term-highlight";

/// Kind of highlight marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Search,
    KeyTerm,
}

impl HighlightKind {
    pub fn class(&self) -> &'static str {
        match self {
            HighlightKind::Search => SEARCH_HIGHLIGHT_CLASS,
            HighlightKind::KeyTerm => KEY_TERM_HIGHLIGHT_CLASS,
        }
    }

    /// Wrap `matched` in this kind's marker.
    pub fn wrap(&self, matched: &str) -> String {
        format!(r#"<mark class="{}">{}</mark>"#, self.class(), matched)
    }
}

/// How a search term is turned into a matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Plain text; regex metacharacters match themselves.
    #[default]
    Literal,
    /// The term is a regular expression.
    Pattern,
}

/// Configured highlighter: an optional search matcher plus the key-term toggle.
#[derive(Debug, Clone)]
pub struct Highlighter {
    search: Option<Regex>,
    key_terms: bool,
}

impl Highlighter {
    /// Highlighter with no search term and key terms enabled.
    pub fn new() -> Self {
        Self {
            search: None,
            key_terms: true,
        }
    }

    /// Set a literal search term. An empty term clears the search.
    pub fn with_search(mut self, term: &str) -> Self {
        self.search = if term.is_empty() {
            None
        } else {
            match build_case_insensitive(&regex::escape(term)) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    // Only reachable when the escaped term exceeds the regex size limit.
                    warn!("Search term ignored: {}", e);
                    None
                }
            }
        };
        self
    }

    /// Set a regular-expression search term. An empty pattern clears the search.
    pub fn with_search_pattern(mut self, pattern: &str) -> Result<Self, HighlightError> {
        self.search = if pattern.is_empty() {
            None
        } else {
            Some(build_case_insensitive(pattern)?)
        };
        Ok(self)
    }

    /// Set the search term interpreted according to `mode`.
    pub fn with_search_mode(self, term: &str, mode: SearchMode) -> Result<Self, HighlightError> {
        match mode {
            SearchMode::Literal => Ok(self.with_search(term)),
            SearchMode::Pattern => self.with_search_pattern(term),
        }
    }

    /// Enable or disable the key-term pass.
    pub fn with_key_terms(mut self, enabled: bool) -> Self {
        self.key_terms = enabled;
        self
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn key_terms_enabled(&self) -> bool {
        self.key_terms
    }

    /// Produce `text` with search and key-term markers inserted.
    pub fn highlight(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut working = text.to_string();

        if let Some(search) = &self.search {
            working = wrap_matches(search, &working, HighlightKind::Search);
        }

        if self.key_terms {
            for (term, pattern) in KEY_TERM_PATTERNS.iter() {
                trace!("Applying key term {:?}", term);
                working = wrap_matches(pattern, &working, HighlightKind::KeyTerm);
            }
        }

        working
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Highlight `text` with a literal search term and optional key terms.
pub fn highlight(text: &str, search_term: &str, highlight_key_terms: bool) -> String {
    Highlighter::new()
        .with_search(search_term)
        .with_key_terms(highlight_key_terms)
        .highlight(text)
}

fn build_case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn wrap_matches(regex: &Regex, text: &str, kind: HighlightKind) -> String {
    regex
        .replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            // Empty matches of user patterns are left alone.
            if matched.is_empty() {
                String::new()
            } else {
                kind.wrap(matched)
            }
        })
        .into_owned()
}
