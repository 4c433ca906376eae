//! Core types and shared functionality for aramaps-cache.
//!
//! This crate provides:
//! - Request/response types exchanged with the cache and the network
//! - Named cache stores with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CacheEntry, CacheStorage};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Request, Response};
