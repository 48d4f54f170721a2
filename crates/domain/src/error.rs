//! Domain error types

use thiserror::Error;

/// Error code attached to a remote API failure.
///
/// The Data API reports failures two ways: through the HTTP status
/// line, and through a script-engine error code carried in the
/// payload. The payload code wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// The HTTP status code, when the payload carried no code of its own.
    Http(u16),
    /// The error code reported inside the response payload.
    Api(String),
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{code}"),
            Self::Api(code) => f.write_str(code),
        }
    }
}

/// Domain-level errors that can occur while parsing or classifying
/// a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A header lookup missed (absent, or present but empty).
    #[error("header not found: {0}")]
    HeaderNotFound(String),

    /// The `Status` pseudo-header did not carry a parsable status code.
    #[error("malformed status line: {0}")]
    MalformedStatus(String),

    /// The remote API signaled a failure.
    #[error("API error {code}: {message}")]
    Api {
        /// Human-readable message extracted from the payload or status.
        message: String,
        /// Payload error code, or the HTTP status as a fallback.
        code: ErrorCode,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
