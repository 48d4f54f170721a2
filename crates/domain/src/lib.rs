//! fmdata Domain - Core types for the Data API client
//!
//! This crate defines the pure data model of the client: response
//! parsing and classification, request option containers, and the
//! builders that translate call arguments into flat option maps.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod options;
pub mod portal;
pub mod query;
pub mod request;
pub mod response;
pub mod scripting;

pub use error::{DomainError, DomainResult, ErrorCode};
pub use options::{
    ListOptions, OptionMap, OptionValue, Sort, SortField, SortOrder, field_data, list_options,
    portal_data,
};
pub use portal::{PortalDirective, portal_options};
pub use query::{FieldFilter, QueryPredicate, query_options};
pub use request::{FileUpload, HttpMethod, Payload, RequestOptions};
pub use response::{Body, Response, ResponseKind, STATUS_HEADER};
pub use scripting::{ScriptDirective, ScriptPhase, script_options};
