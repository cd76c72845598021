//! Interactive document viewer state.
//!
//! Front-ends drive this state: they mark a load as started, run extraction
//! however they like (blocking task, JS promise) and hand back the outcome.
//! Nothing here prevents a second load from starting while one is pending.

use serde::Serialize;
use std::num::NonZeroU32;
use tracing::{debug, warn};

use crate::error::Error;
use crate::format::DocumentFormat;
use crate::highlight::{Highlighter, SearchMode};
use crate::models::{LoadedDocument, TextSegment};

/// Message shown when a URL load is submitted without a URL.
pub const EMPTY_URL_MESSAGE: &str = "Please enter a URL";

/// A segment rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSegment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<NonZeroU32>,
    /// Segment text with highlight markers.
    pub markup: String,
}

/// State of one viewer session.
#[derive(Debug, Clone)]
pub struct ViewerState {
    document: Option<LoadedDocument>,
    search_term: String,
    search_mode: SearchMode,
    highlight_key_terms: bool,
    is_loading: bool,
    error: Option<String>,
    /// Set while the search term is not a valid pattern.
    pattern_error: Option<String>,
}

impl ViewerState {
    /// Empty viewer with key-term highlighting on.
    pub fn new() -> Self {
        Self {
            document: None,
            search_term: String::new(),
            search_mode: SearchMode::Literal,
            highlight_key_terms: true,
            is_loading: false,
            error: None,
            pattern_error: None,
        }
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Mark a load as started, clearing any previous error.
    pub fn begin_load(&mut self) {
        self.error = None;
        self.is_loading = true;
    }

    /// Record the outcome of a load.
    pub fn finish_load(&mut self, result: Result<LoadedDocument, Error>) {
        self.is_loading = false;
        match result {
            Ok(document) => {
                debug!("Loaded {} ({})", document.name, document.page_summary());
                self.document = Some(document);
            }
            Err(e) => {
                warn!("Document load failed: {}", e);
                self.error = Some(e.user_message());
            }
        }
    }

    /// Validate a URL before fetching. Returns false and sets the error for an empty URL.
    pub fn check_url(&mut self, url: &str) -> bool {
        self.error = None;
        if url.is_empty() {
            self.error = Some(EMPTY_URL_MESSAGE.to_string());
            return false;
        }
        true
    }

    /// Drop the loaded document, search term and error.
    pub fn reset(&mut self) {
        self.document = None;
        self.search_term.clear();
        self.error = None;
        self.pattern_error = None;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_highlight_key_terms(&mut self, enabled: bool) {
        self.highlight_key_terms = enabled;
    }

    pub fn toggle_key_terms(&mut self) {
        self.highlight_key_terms = !self.highlight_key_terms;
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn segments(&self) -> &[TextSegment] {
        self.document.as_ref().map(|d| d.segments.as_slice()).unwrap_or(&[])
    }

    /// Name of the loaded document, empty when nothing is loaded.
    pub fn file_name(&self) -> &str {
        self.document.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        self.document.as_ref().map(|d| d.format)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn highlight_key_terms(&self) -> bool {
        self.highlight_key_terms
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Load error, else the error of an invalid search pattern.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or(self.pattern_error.as_deref())
    }

    /// Highlighter for the current search term and toggle.
    ///
    /// An invalid pattern in pattern mode is reported as the visible error
    /// until the next valid term, and the search is skipped; key terms still apply.
    pub fn highlighter(&mut self) -> Highlighter {
        let base = Highlighter::new().with_key_terms(self.highlight_key_terms);
        match base.clone().with_search_mode(&self.search_term, self.search_mode) {
            Ok(highlighter) => {
                self.pattern_error = None;
                highlighter
            }
            Err(e) => {
                self.pattern_error = Some(e.to_string());
                base
            }
        }
    }

    /// Highlight every segment of the loaded document.
    pub fn render(&mut self) -> Vec<RenderedSegment> {
        let highlighter = self.highlighter();
        self.segments()
            .iter()
            .map(|segment| RenderedSegment {
                page_number: segment.page_number,
                markup: highlighter.highlight(&segment.text),
            })
            .collect()
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, PdfError};
    use pretty_assertions::assert_eq;

    fn loaded() -> LoadedDocument {
        LoadedDocument::new(
            "report.pdf",
            DocumentFormat::Pdf,
            vec![
                TextSegment::page("A breach occurred.", NonZeroU32::new(1).unwrap()),
                TextSegment::page("", NonZeroU32::new(2).unwrap()),
            ],
        )
    }

    #[test]
    fn test_successful_load() {
        let mut viewer = ViewerState::new();
        viewer.begin_load();
        assert!(viewer.is_loading());

        viewer.finish_load(Ok(loaded()));
        assert!(!viewer.is_loading());
        assert_eq!(viewer.error(), None);
        assert_eq!(viewer.file_name(), "report.pdf");
        assert_eq!(viewer.segments().len(), 2);
    }

    #[test]
    fn test_failed_load_sets_error_and_clears_loading() {
        let mut viewer = ViewerState::new();
        viewer.begin_load();
        viewer.finish_load(Err(ExtractionError::from(PdfError::Encrypted).into()));

        assert!(!viewer.is_loading());
        assert_eq!(
            viewer.error(),
            Some("Failed to extract text from PDF. Please try another file.")
        );
        assert!(viewer.document().is_none());
    }

    #[test]
    fn test_begin_load_clears_error() {
        let mut viewer = ViewerState::new();
        viewer.finish_load(Err(Error::unsupported("text/plain")));
        assert!(viewer.error().is_some());
        viewer.begin_load();
        assert_eq!(viewer.error(), None);
    }

    #[test]
    fn test_empty_url() {
        let mut viewer = ViewerState::new();
        assert!(!viewer.check_url(""));
        assert_eq!(viewer.error(), Some(EMPTY_URL_MESSAGE));
        assert!(viewer.check_url("https://example.com/a.pdf"));
        assert_eq!(viewer.error(), None);
    }

    #[test]
    fn test_reset() {
        let mut viewer = ViewerState::new();
        viewer.finish_load(Ok(loaded()));
        viewer.set_search_term("breach");
        viewer.toggle_key_terms();

        viewer.reset();
        assert!(viewer.document().is_none());
        assert_eq!(viewer.search_term(), "");
        assert_eq!(viewer.file_name(), "");
        assert_eq!(viewer.error(), None);
        // The toggle survives a reset.
        assert!(!viewer.highlight_key_terms());
    }

    #[test]
    fn test_render() {
        let mut viewer = ViewerState::new();
        viewer.finish_load(Ok(loaded()));

        let rendered = viewer.render();
        assert_eq!(
            rendered[0].markup,
            r#"A <mark class="key-term-highlight">breach</mark> occurred."#
        );
        assert_eq!(rendered[1].markup, "");
        assert_eq!(rendered[1].page_number.map(|n| n.get()), Some(2));

        viewer.set_highlight_key_terms(false);
        viewer.set_search_term("OCC");
        assert_eq!(
            viewer.render()[0].markup,
            r#"A breach <mark class="search-highlight">occ</mark>urred."#
        );
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let mut viewer = ViewerState::new().with_search_mode(SearchMode::Pattern);
        viewer.finish_load(Ok(loaded()));
        viewer.set_search_term("(");

        let rendered = viewer.render();
        assert!(viewer.error().is_some());
        assert_eq!(
            rendered[0].markup,
            r#"A <mark class="key-term-highlight">breach</mark> occurred."#
        );
    }

    #[test]
    fn test_valid_pattern_clears_pattern_error() {
        let mut viewer = ViewerState::new().with_search_mode(SearchMode::Pattern);
        viewer.finish_load(Ok(loaded()));
        viewer.set_highlight_key_terms(false);

        viewer.set_search_term("(");
        viewer.render();
        assert!(viewer.error().is_some());

        viewer.set_search_term("(occ)");
        let rendered = viewer.render();
        assert_eq!(viewer.error(), None);
        assert_eq!(
            rendered[0].markup,
            r#"A breach <mark class="search-highlight">occ</mark>urred."#
        );
    }
}
