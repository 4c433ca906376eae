//! Cache inspection tools.
//!
//! These read the SQLite cache directly and never go through the worker.

pub mod get;
pub mod stores;

pub use get::{CacheGetParams, get_impl};
pub use stores::stores_impl;
