//! Test doubles for the storage and network primitives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aramaps_core::{CacheDb, CacheStorage, Error, Request, Response};
use async_trait::async_trait;
use url::Url;

use super::{CacheProxy, HostControl, ProxyConfig};
use crate::fetch::Network;

pub(crate) fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[derive(Default)]
struct StubState {
    responses: HashMap<String, (u16, String)>,
    calls: HashMap<String, usize>,
}

/// Network double: canned responses by URL, a per-URL call counter, and an
/// `HttpError` for anything not registered.
#[derive(Clone, Default)]
pub(crate) struct StubNetwork {
    state: Arc<Mutex<StubState>>,
}

impl StubNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(url.to_string(), (status, body.into()));
    }

    pub(crate) fn forget(&self, url: &str) {
        self.state.lock().unwrap().responses.remove(url);
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.state.lock().unwrap().calls.get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url().as_str();
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(url.to_string()).or_default() += 1;
        match state.responses.get(url) {
            Some((status, body)) => Ok(Response::new(url, *status, body.clone().into_bytes())
                .with_header("content-type", "application/octet-stream")),
            None => Err(Error::HttpError(format!("network error: {url}: connection refused"))),
        }
    }
}

/// Storage double that delegates to a real database but can be told to fail
/// lookups or writes.
pub(crate) struct FlakyStorage {
    inner: CacheDb,
    fail_matches: AtomicBool,
    fail_puts: AtomicBool,
}

impl FlakyStorage {
    pub(crate) fn new(inner: CacheDb) -> Self {
        Self { inner, fail_matches: AtomicBool::new(false), fail_puts: AtomicBool::new(false) }
    }

    pub(crate) fn fail_matches(&self) {
        self.fail_matches.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    fn injected() -> Error {
        Error::CorruptEntry("injected storage failure".into())
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.inner.open(store).await
    }

    async fn has(&self, store: &str) -> Result<bool, Error> {
        self.inner.has(store).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, store: &str) -> Result<bool, Error> {
        self.inner.delete(store).await
    }

    async fn match_request(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        if self.fail_matches.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.match_request(store, request).await
    }

    async fn put(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.put(store, request, response).await
    }

    async fn put_all(&self, store: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.put_all(store, entries).await
    }
}

/// Storage double whose single-entry writes take `delay` before landing.
pub(crate) struct SlowStorage {
    inner: CacheDb,
    delay: Duration,
}

impl SlowStorage {
    pub(crate) fn new(inner: CacheDb, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl CacheStorage for SlowStorage {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.inner.open(store).await
    }

    async fn has(&self, store: &str) -> Result<bool, Error> {
        self.inner.has(store).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, store: &str) -> Result<bool, Error> {
        self.inner.delete(store).await
    }

    async fn match_request(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_request(store, request).await
    }

    async fn put(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(store, request, response).await
    }

    async fn put_all(&self, store: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        self.inner.put_all(store, entries).await
    }
}

/// A proxy for `aramaps-v1` with the default asset markers.
pub(crate) fn proxy_with(
    db: CacheDb, network: StubNetwork, precache: &[&str],
) -> (CacheProxy<CacheDb, StubNetwork>, Arc<HostControl>) {
    let control = Arc::new(HostControl::new());
    let config = ProxyConfig::new(
        "aramaps-v1",
        precache.iter().map(|s| url(s)).collect(),
        vec![".pbf".into(), ".ttf".into(), ".png".into()],
    );
    let proxy = CacheProxy::new(config, Arc::new(db), Arc::new(network), control.clone());
    (proxy, control)
}
