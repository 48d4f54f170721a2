//! Port definitions (interfaces)
//!
//! Ports define the boundary between the client core and external
//! systems. The only port here is the HTTP executor, implemented by an
//! adapter in the infrastructure layer.

mod http;

pub use http::{HttpExecutor, RawExchange, TransportError, WireBody};
