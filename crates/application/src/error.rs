//! Client error types

use thiserror::Error;

use fmdata_domain::DomainError;

use crate::ports::TransportError;

/// Errors surfaced by the session client.
///
/// Nothing is caught or retried internally; every failure propagates
/// to the immediate caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Response parsing or API-level validation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The transport collaborator failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session is missing the credentials the call requires.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A successful response did not carry the documented field.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, Error>;
