//! Error types for request decoding and validation.
//!
//! Every variant displays as the operator-facing message sent back in the
//! `{"error": ...}` body. Diagnostic detail (offending values, parser
//! messages) is carried in fields and only ever written to the log.

use thiserror::Error;

/// Failures that turn a request into a `400 Bad Request` response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The request method is neither `GET` nor `POST`.
    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    /// The request targets a script other than the configured one.
    #[error("Not Found")]
    NotFound { script_name: String },

    /// A POST arrived without a content type.
    #[error("Content-Type is missing")]
    MissingContentType,

    /// A POST declared a content type other than JSON or form encoding.
    #[error("Content-Type is not supported")]
    UnsupportedContentType { content_type: String },

    /// The body could not be decoded in the declared encoding.
    #[error("Invalid request body")]
    InvalidBody { detail: String },

    /// The declared body length exceeds the accepted maximum.
    #[error("Request body too large")]
    BodyTooLarge { size: usize, max_size: usize },

    /// One or more of the coordinates is absent.
    #[error("Missing required parameters")]
    MissingParameters { missing: Vec<&'static str> },

    /// A coordinate is not a decimal number.
    #[error("Invalid number format")]
    InvalidNumber { field: &'static str, value: String },

    /// The coordinates lie outside the accepted domain.
    #[error("Invalid data, try again :)")]
    InvalidData,

    /// A history request carried no usable session id.
    #[error("Missing required parameter: sessionId")]
    MissingSessionId,
}

impl ProtocolError {
    /// Creates an unsupported method error; a missing method is reported empty.
    pub fn unsupported_method(method: Option<&str>) -> Self {
        Self::UnsupportedMethod {
            method: method.unwrap_or_default().to_owned(),
        }
    }

    /// Creates a not found error for the requested script.
    pub fn not_found(script_name: Option<&str>) -> Self {
        Self::NotFound {
            script_name: script_name.unwrap_or_default().to_owned(),
        }
    }

    /// Creates an unsupported content type error.
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Creates an invalid body error.
    pub fn invalid_body(detail: impl Into<String>) -> Self {
        Self::InvalidBody {
            detail: detail.into(),
        }
    }

    /// Creates an invalid number error.
    pub fn invalid_number(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field,
            value: value.into(),
        }
    }

    /// Short machine-friendly name used in log events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedMethod { .. } => "unsupported_method",
            Self::NotFound { .. } => "not_found",
            Self::MissingContentType => "missing_content_type",
            Self::UnsupportedContentType { .. } => "unsupported_content_type",
            Self::InvalidBody { .. } => "invalid_body",
            Self::BodyTooLarge { .. } => "body_too_large",
            Self::MissingParameters { .. } => "missing_parameters",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::InvalidData => "invalid_data",
            Self::MissingSessionId => "missing_session_id",
        }
    }
}
