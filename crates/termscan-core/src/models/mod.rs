//! Data models.

pub mod config;
pub mod document;

pub use config::TermscanConfig;
pub use document::{document_name_from_url, LoadedDocument, TextSegment};
