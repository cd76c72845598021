//! Document text extraction.

mod docx;
mod pdf;

pub use docx::{extract_docx, DocxTextExtractor};
pub use pdf::{extract_pdf, PdfTextExtractor};

use crate::error::{ExtractionError, Result};
use crate::format::DocumentFormat;
use crate::models::TextSegment;

/// Trait for format-specific text extractors.
///
/// Extraction is all-or-nothing: either every segment is produced or the
/// whole document fails.
pub trait TextExtractor {
    /// Format handled by this extractor.
    fn format(&self) -> DocumentFormat;

    /// Extract ordered text segments from raw document bytes.
    fn extract(&self, data: &[u8]) -> std::result::Result<Vec<TextSegment>, ExtractionError>;
}

/// Extractor for a supported format, `None` for `Unsupported`.
pub fn extractor_for(format: DocumentFormat) -> Option<Box<dyn TextExtractor + Send + Sync>> {
    match format {
        DocumentFormat::Pdf => Some(Box::new(PdfTextExtractor::new())),
        DocumentFormat::Docx => Some(Box::new(DocxTextExtractor::new())),
        DocumentFormat::Unsupported => None,
    }
}

/// Extract text from `data` using the extractor for `format`.
pub fn extract(data: &[u8], format: DocumentFormat) -> Result<Vec<TextSegment>> {
    let extractor = extractor_for(format).ok_or_else(|| crate::Error::unsupported(format.to_string()))?;
    Ok(extractor.extract(data)?)
}
