//! Service-level errors

use docfill_ooxml::OoxmlError;
use thiserror::Error;

/// Errors returned by the document services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No stored document with this id
    #[error("document not found: {0}")]
    NotFound(String),

    /// The blob is not a usable word-processing document
    #[error("invalid document format: {0}")]
    InvalidFormat(String),

    /// The request itself is unacceptable; the message is user-facing
    #[error("{0}")]
    Validation(String),

    /// Anything else: storage, archive or serialization failures
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<OoxmlError> for ServiceError {
    fn from(err: OoxmlError) -> Self {
        if err.is_invalid_document() {
            ServiceError::InvalidFormat(err.to_string())
        } else {
            ServiceError::Internal(err.to_string())
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
