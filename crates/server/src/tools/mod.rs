//! MCP tool implementations.
//!
//! This module contains all tools exposed by the aramaps-cache server.

pub mod cache;
pub mod proxy_fetch;

pub use proxy_fetch::{ProxyFetchParams, fetch_impl};
