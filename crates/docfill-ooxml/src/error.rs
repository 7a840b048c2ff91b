//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur while unpacking, reading or repacking a document
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

impl OoxmlError {
    /// Whether this error means the package is not a usable word-processing document
    pub fn is_invalid_document(&self) -> bool {
        matches!(self, OoxmlError::MissingFile(_) | OoxmlError::InvalidStructure(_))
    }
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
