//! The cache storage primitive the proxy is written against.
//!
//! Mirrors what a browser host offers: stores opened and deleted by name,
//! entries matched and put by request. Every operation may suspend.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::{Error, Request, Response};

#[async_trait]
pub trait CacheStorage: Send + Sync + 'static {
    /// Open (creating if absent) the named store.
    async fn open(&self, store: &str) -> Result<(), Error>;

    /// Whether the named store exists.
    async fn has(&self, store: &str) -> Result<bool, Error>;

    /// Names of every existing store.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete the named store. Deleting a store that doesn't exist returns
    /// `Ok(false)`.
    async fn delete(&self, store: &str) -> Result<bool, Error>;

    /// Exact-key lookup of a request in the named store.
    async fn match_request(&self, store: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Write one entry, replacing any previous entry for the request.
    async fn put(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Write a batch of entries atomically.
    async fn put_all(&self, store: &str, entries: &[(Request, Response)]) -> Result<(), Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.open_store(store).await
    }

    async fn has(&self, store: &str) -> Result<bool, Error> {
        self.has_store(store).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, store: &str) -> Result<bool, Error> {
        self.delete_store(store).await
    }

    async fn match_request(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.match_entry(store, request).await
    }

    async fn put(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_entry(store, request, response).await
    }

    async fn put_all(&self, store: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        self.put_entries(store, entries).await
    }
}
