//! Mapping of service errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docfill_core::ServiceError;

/// Public messages for one endpoint
#[derive(Debug, Clone, Copy)]
pub(crate) struct Messages {
    pub not_found: &'static str,
    pub internal: &'static str,
}

pub(crate) const UPLOAD: Messages = Messages {
    not_found: "Document not found",
    internal: "Failed to process document",
};

pub(crate) const DOWNLOAD: Messages = Messages {
    not_found: "Original document not found",
    internal: "Failed to generate document",
};

pub(crate) const LOOKUP: Messages = Messages {
    not_found: "Document not found",
    internal: "Failed to load document",
};

/// An error response: status plus `{"error": message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Internal details are logged, never returned
    pub(crate) fn from_service(err: ServiceError, messages: Messages) -> Self {
        match err {
            ServiceError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            ServiceError::NotFound(id) => {
                tracing::debug!(document = %id, "document not found");
                Self::new(StatusCode::NOT_FOUND, messages.not_found)
            }
            ServiceError::InvalidFormat(detail) => {
                tracing::warn!(error = %detail, "invalid document format");
                Self::new(StatusCode::BAD_REQUEST, "Invalid document format")
            }
            ServiceError::Internal(detail) => {
                tracing::error!(error = %detail, "{}", messages.internal);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, messages.internal)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
