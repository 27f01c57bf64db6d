//! Format-specific text extraction for uploaded documents.
//!
//! Extraction never touches the network: a document that cannot be read fails here, before any
//! completion request is paid for. PDF and DOCX parsing both work on the in-memory buffer, so no
//! temporary files are involved.

mod docx;
mod pdf;
mod text;

use bytes::Bytes;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while turning a document into plain text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The file could not be opened or decoded by its format library.
    #[error("Document is unreadable: {0}")]
    Unreadable(String),
    /// A text file was not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    InvalidEncoding(String),
    /// The declared extension is not one of `pdf`, `docx`, or `txt`.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// The document was readable but contained no text.
    #[error("No text extracted from the document")]
    NoText,
}

/// Declared type of an uploaded document, derived from its file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// UTF-8 plain text.
    Txt,
    /// Any other extension (lower-cased, possibly empty).
    Unknown(String),
}

impl DocumentFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.trim().to_lowercase();
        match extension.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" => Self::Txt,
            _ => Self::Unknown(extension),
        }
    }

    /// Derive the format from a file name such as `lease.PDF`.
    pub fn from_file_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|value| value.to_str())
            .unwrap_or("");
        Self::from_extension(extension)
    }

    /// Whether the extractor can handle this format.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Docx => f.write_str("docx"),
            Self::Txt => f.write_str("txt"),
            Self::Unknown(extension) => write!(f, "unknown ({extension})"),
        }
    }
}

/// An uploaded file: its name, raw bytes, and declared format.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    bytes: Bytes,
    format: DocumentFormat,
}

impl Document {
    /// Build a document, declaring its format from the file name's extension.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let format = DocumentFormat::from_file_name(&name);
        Self {
            name,
            bytes: bytes.into(),
            format,
        }
    }

    /// File name as uploaded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Format declared by the file extension.
    pub fn format(&self) -> &DocumentFormat {
        &self.format
    }
}

/// Extract plain text from a document according to its declared format.
pub fn extract(document: &Document) -> Result<String, ExtractionError> {
    let bytes = document.bytes().as_ref();
    let text = match document.format() {
        DocumentFormat::Pdf => pdf::extract(bytes)?,
        DocumentFormat::Docx => docx::extract(bytes)?,
        DocumentFormat::Txt => text::extract(bytes)?,
        DocumentFormat::Unknown(extension) => {
            return Err(ExtractionError::UnsupportedFormat(extension.clone()));
        }
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }

    tracing::debug!(
        document = document.name(),
        format = %document.format(),
        chars = text.len(),
        "Extracted document text"
    );
    Ok(text)
}
