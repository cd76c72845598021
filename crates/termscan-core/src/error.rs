//! Error types for the termscan-core library.

use thiserror::Error;

use crate::format::DocumentFormat;

/// Main error type for the termscan library.
#[derive(Error, Debug)]
pub enum Error {
    /// The content type or file type is neither PDF nor Word-family.
    #[error("unsupported file format: {hint}")]
    UnsupportedFormat { hint: String },

    /// The decoder failed on the document bytes.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Fetching the document failed before any bytes reached the extractor.
    #[error("transport error: {message}")]
    Transport {
        /// HTTP status code, when the server answered.
        status: Option<u16>,
        message: String,
    },

    /// Highlighter construction error.
    #[error("highlight error: {0}")]
    Highlight(#[from] HighlightError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an unsupported-format error from whatever hint was classified.
    pub fn unsupported(hint: impl Into<String>) -> Self {
        Self::UnsupportedFormat { hint: hint.into() }
    }

    /// Transport error for a non-success HTTP status.
    pub fn http_status(status: u16) -> Self {
        Self::Transport {
            status: Some(status),
            message: format!("HTTP error! Status: {}", status),
        }
    }

    /// Transport error for a failure without a status (DNS, TLS, reset...).
    pub fn network(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Message suitable for showing to the person who picked the document.
    pub fn user_message(&self) -> String {
        match self {
            Error::UnsupportedFormat { .. } => {
                "Unsupported file format. Please upload PDF or DOCX files.".to_string()
            }
            Error::Extraction(e) => match e.format() {
                DocumentFormat::Pdf => {
                    "Failed to extract text from PDF. Please try another file.".to_string()
                }
                _ => "Failed to extract text from DOCX. Please try another file.".to_string(),
            },
            Error::Transport { message, .. } => format!("Failed to fetch document: {}", message),
            other => other.to_string(),
        }
    }

    /// Whether this error came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

/// Errors raised by the document decoders.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// PDF decoding error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// DOCX decoding error.
    #[error("DOCX error: {0}")]
    Docx(#[from] DocxError),

    /// The decoder did not run to completion (for instance it panicked).
    #[error("{format} extraction aborted: {reason}")]
    Aborted { format: DocumentFormat, reason: String },
}

impl ExtractionError {
    /// Format whose decoder failed.
    pub fn format(&self) -> DocumentFormat {
        match self {
            ExtractionError::Pdf(_) => DocumentFormat::Pdf,
            ExtractionError::Docx(_) => DocumentFormat::Docx,
            ExtractionError::Aborted { format, .. } => *format,
        }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be opened with an empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// A page's content stream could not be read or decoded.
    #[error("failed to read content of page {page}: {reason}")]
    PageContent { page: u32, reason: String },
}

/// Errors related to DOCX processing.
#[derive(Error, Debug)]
pub enum DocxError {
    /// The bytes are not a readable ZIP package.
    #[error("invalid package: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A required package part is absent.
    #[error("missing package part: {0}")]
    MissingPart(String),

    /// The part is not valid UTF-8 text.
    #[error("failed to read {part}: {reason}")]
    Read { part: String, reason: String },

    /// The main document XML is malformed.
    #[error("malformed document XML: {0}")]
    Xml(String),
}

/// Errors related to building a highlighter.
#[derive(Error, Debug)]
pub enum HighlightError {
    /// The search pattern does not compile.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type for the termscan library.
pub type Result<T> = std::result::Result<T, Error>;
