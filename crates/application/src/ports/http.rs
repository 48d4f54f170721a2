//! HTTP executor port
//!
//! The executor performs exactly one network round-trip and hands back
//! the raw header block and body text. Everything above it (URL and
//! body marshaling, parsing, validation) is transport-agnostic.

use async_trait::async_trait;
use thiserror::Error;

use fmdata_domain::{FileUpload, HttpMethod};

/// Body handed to the executor, already marshaled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireBody {
    /// No body.
    Empty,
    /// A serialized JSON document.
    Json(String),
    /// A multipart upload with a single `upload` part.
    Multipart(FileUpload),
}

/// The raw result of one HTTP round-trip.
///
/// `header_text` carries standard `Key: Value` lines plus a trailing
/// synthetic `Status: HTTP/x.x <code> <reason>` line so the status code
/// travels through the same parsing path as real headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExchange {
    /// Raw response header block.
    pub header_text: String,
    /// Raw response body text.
    pub body_text: String,
}

/// Errors raised by the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request timed out.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The remote host refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// DNS resolution failed.
    #[error("DNS resolution failed for {host}: {message}")]
    Dns {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request body could not be constructed.
    #[error("invalid body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Executes HTTP requests.
///
/// Implementations own socket and TLS concerns, including timeouts and
/// cancellation; the client core defines neither.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Performs one request and returns the raw exchange.
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
        body: WireBody,
    ) -> Result<RawExchange, TransportError>;
}
