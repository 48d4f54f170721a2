//! fmdata Application - Session client and request marshaling
//!
//! This crate composes the domain option builders with the transport
//! port: [`RequestSender`] marshals one call into one wire request and
//! validates the result, and [`DataApiClient`] exposes the Data API
//! operations while holding the session token.

pub mod error;
pub mod ports;
pub mod sender;
pub mod session;

pub use error::{ClientResult, Error};
pub use ports::{HttpExecutor, RawExchange, TransportError, WireBody};
pub use sender::RequestSender;
pub use session::{Credentials, DataApiClient, SessionConfig};
