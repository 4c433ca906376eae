//! Named cache stores backed by SQLite.
//!
//! This module provides persistent, host-style cache storage using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named stores that are opened (created) and deleted as a whole
//! - Entries keyed by request identity, replaced wholesale on write
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CacheEntry;
pub use storage::CacheStorage;
