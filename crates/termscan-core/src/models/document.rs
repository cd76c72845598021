//! Extracted document data models.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::format::DocumentFormat;

/// One unit of extracted text: a PDF page, or a whole DOCX document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    /// Extracted text. May be empty.
    pub text: String,
    /// Page number (1-indexed), present only for paginated sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<NonZeroU32>,
}

impl TextSegment {
    /// Segment for a page of a paginated document.
    pub fn page(text: impl Into<String>, page_number: NonZeroU32) -> Self {
        Self {
            text: text.into(),
            page_number: Some(page_number),
        }
    }

    /// Segment covering a whole non-paginated document.
    pub fn whole(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_number: None,
        }
    }
}

/// A document whose text has been extracted and is ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedDocument {
    /// Display name (file name or last URL path segment).
    pub name: String,
    /// Format the extractor was chosen by.
    pub format: DocumentFormat,
    /// Segments in document order.
    pub segments: Vec<TextSegment>,
}

impl LoadedDocument {
    pub fn new(name: impl Into<String>, format: DocumentFormat, segments: Vec<TextSegment>) -> Self {
        Self {
            name: name.into(),
            format,
            segments,
        }
    }

    /// Short page count label, e.g. "1 page" or "12 pages".
    pub fn page_summary(&self) -> String {
        if self.segments.len() > 1 {
            format!("{} pages", self.segments.len())
        } else {
            "1 page".to_string()
        }
    }

    /// All segment text joined by blank lines.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Display name for a document fetched from `url`: its last path segment.
pub fn document_name_from_url(url: &str) -> String {
    match url.rsplit('/').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => "document".to_string(),
    }
}
