//! Port adapters

mod reqwest_executor;

pub use reqwest_executor::ReqwestExecutor;
