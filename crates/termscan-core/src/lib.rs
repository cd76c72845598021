//! Core library for termscan.
//!
//! This crate provides:
//! - Text extraction from PDF (one segment per page) and DOCX (one segment)
//! - Document format detection from content types and file names
//! - Search-term and key-term highlighting
//! - Viewer session state shared by the CLI and WASM front-ends

pub mod error;
pub mod extract;
pub mod format;
pub mod highlight;
pub mod models;
pub mod viewer;

#[cfg(test)]
mod fixtures;

pub use error::{DocxError, Error, ExtractionError, HighlightError, PdfError, Result};
pub use extract::{extract, extract_docx, extract_pdf, extractor_for, TextExtractor};
pub use format::{mime_for_path, DocumentFormat};
pub use highlight::{count_key_terms, highlight, Highlighter, KeyTermHits, SearchMode, KEY_TERMS};
pub use models::{document_name_from_url, LoadedDocument, TermscanConfig, TextSegment};
pub use viewer::{RenderedSegment, ViewerState};
