//! fmdata Infrastructure - Transport adapters
//!
//! This crate provides the concrete implementation of the HTTP
//! executor port defined in the application layer.

pub mod adapters;

pub use adapters::ReqwestExecutor;
