//! Document format detection from content types, file MIME types and extensions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// MIME type for PDF documents.
pub const PDF_MIME: &str = "application/pdf";
/// MIME type for OOXML word-processing documents.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type for legacy Word documents.
pub const MSWORD_MIME: &str = "application/msword";

/// Format of a document, as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Paginated PDF document.
    Pdf,
    /// Word-family document (OOXML, or legacy `.doc` routed the same way).
    Docx,
    /// Anything else.
    Unsupported,
}

impl DocumentFormat {
    /// Classify a transport content type.
    ///
    /// Matching is by substring so parameter suffixes (`; charset=...`) and
    /// vendor variants such as `application/x-pdf` are tolerated.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.contains("pdf") {
            DocumentFormat::Pdf
        } else if content_type.contains("officedocument.wordprocessingml.document")
            || content_type.contains("msword")
        {
            DocumentFormat::Docx
        } else {
            DocumentFormat::Unsupported
        }
    }

    /// Classify a declared file MIME type. Unlike content types this is an exact match.
    pub fn from_file_mime(mime: &str) -> Self {
        match mime {
            PDF_MIME => DocumentFormat::Pdf,
            DOCX_MIME | MSWORD_MIME => DocumentFormat::Docx,
            _ => DocumentFormat::Unsupported,
        }
    }

    /// Classify a local file by its extension.
    pub fn from_path(path: &Path) -> Self {
        mime_for_path(path)
            .map(Self::from_file_mime)
            .unwrap_or(DocumentFormat::Unsupported)
    }

    /// Canonical MIME type for this format.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            DocumentFormat::Pdf => Some(PDF_MIME),
            DocumentFormat::Docx => Some(DOCX_MIME),
            DocumentFormat::Unsupported => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentFormat::Unsupported)
    }

    /// Turn `Unsupported` into an error carrying the classified hint.
    pub fn require_supported(self, hint: &str) -> Result<Self> {
        if self.is_supported() {
            Ok(self)
        } else {
            Err(Error::unsupported(hint))
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// MIME type a file picker would declare for this path's extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "pdf" => Some(PDF_MIME),
        "docx" => Some(DOCX_MIME),
        "doc" => Some(MSWORD_MIME),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_content_type_pdf() {
        assert_eq!(DocumentFormat::from_content_type("application/pdf"), DocumentFormat::Pdf);
        assert_eq!(
            DocumentFormat::from_content_type("application/pdf; charset=binary"),
            DocumentFormat::Pdf
        );
        assert_eq!(DocumentFormat::from_content_type("application/x-pdf"), DocumentFormat::Pdf);
    }

    #[test]
    fn test_content_type_docx() {
        assert_eq!(DocumentFormat::from_content_type(DOCX_MIME), DocumentFormat::Docx);
        assert_eq!(
            DocumentFormat::from_content_type("application/msword"),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_content_type_unsupported() {
        assert_eq!(DocumentFormat::from_content_type("text/plain"), DocumentFormat::Unsupported);
        assert_eq!(DocumentFormat::from_content_type(""), DocumentFormat::Unsupported);
        // Substring match is case-sensitive, as delivered by the transport.
        assert_eq!(
            DocumentFormat::from_content_type("APPLICATION/PDF"),
            DocumentFormat::Unsupported
        );
    }

    #[test]
    fn test_pdf_wins_over_word() {
        assert_eq!(
            DocumentFormat::from_content_type("application/msword+pdf"),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_file_mime_is_exact() {
        assert_eq!(DocumentFormat::from_file_mime(PDF_MIME), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_file_mime(MSWORD_MIME), DocumentFormat::Docx);
        assert_eq!(
            DocumentFormat::from_file_mime("application/pdf; charset=binary"),
            DocumentFormat::Unsupported
        );
    }

    #[test]
    fn test_from_path() {
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("a/report.PDF")), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("memo.docx")), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("old.doc")), DocumentFormat::Docx);
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("notes.txt")),
            DocumentFormat::Unsupported
        );
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("README")), DocumentFormat::Unsupported);
    }

    #[test]
    fn test_require_supported() {
        assert!(DocumentFormat::Pdf.require_supported("application/pdf").is_ok());
        let err = DocumentFormat::Unsupported.require_supported("text/html").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref hint } if hint == "text/html"));
    }

    #[test]
    fn test_display() {
        assert_eq!(DocumentFormat::Pdf.to_string(), "pdf");
        assert_eq!(DocumentFormat::Docx.to_string(), "docx");
        assert_eq!(DocumentFormat::Unsupported.to_string(), "unsupported");
    }
}
