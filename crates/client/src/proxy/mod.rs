//! Cache-first proxy with precache, generation cleanup and opportunistic
//! asset caching.
//!
//! ### Lifecycle
//! - **install**: open the current store, fetch every precache URL, write
//!   them all in one batch, ask the host to skip waiting. Any failed or
//!   non-2xx manifest fetch fails the whole install and stores nothing.
//! - **activate**: delete every store whose name is not the current cache
//!   name, then claim open clients.
//! - **fetch**: exact-key lookup in the current store; on a miss go to the
//!   network, and when the response is 2xx and the URL contains an asset
//!   marker, write a copy to the store in a detached task.
//!
//! Background write failures never reach the caller. Only GET requests are
//! looked up or stored.

pub mod assets;
pub mod control;
pub mod registration;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use aramaps_core::config::DEFAULT_MAX_BYTES;
use aramaps_core::{AppConfig, CacheStorage, Error, Request, Response};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use tokio::task::JoinHandle;
use url::Url;

use crate::fetch::{Network, resolve};

pub use assets::AssetMatcher;
pub use control::{ClientControl, HostControl};
pub use registration::{Registration, WorkerState};

/// One async method per lifecycle event. The host awaits each future before
/// moving on.
#[async_trait]
pub trait LifecycleHandler: Send + Sync + 'static {
    async fn on_install(&self) -> Result<(), Error>;

    async fn on_activate(&self) -> Result<(), Error>;

    async fn on_fetch(&self, request: Request) -> Result<FetchOutcome, Error>;
}

/// Proxy settings fixed at construction.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Current cache generation.
    pub cache_name: String,
    /// Absolute precache URLs, in manifest order.
    pub precache: Vec<Url>,
    /// URL substrings eligible for opportunistic caching.
    pub asset_markers: Vec<String>,
    /// Asset responses with a larger body are returned but not stored.
    pub max_entry_bytes: usize,
}

impl ProxyConfig {
    pub fn new(cache_name: impl Into<String>, precache: Vec<Url>, asset_markers: Vec<String>) -> Self {
        Self { cache_name: cache_name.into(), precache, asset_markers, max_entry_bytes: DEFAULT_MAX_BYTES }
    }

    pub fn with_max_entry_bytes(mut self, max_entry_bytes: usize) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self
    }

    /// Build from application config, resolving relative manifest entries
    /// against the origin.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = config
            .origin_url()
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let precache = config
            .precache
            .iter()
            .map(|entry| resolve(&origin, entry).map_err(|e| Error::InvalidUrl(format!("{entry}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(config.cache_name.clone(), precache, config.asset_markers.clone()).with_max_entry_bytes(config.max_bytes))
    }
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
        }
    }
}

/// Result of handling one fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
    /// The detached cache write, if one was started. Dropping the handle
    /// leaves the write running.
    pub pending_write: Option<JoinHandle<()>>,
}

impl FetchOutcome {
    pub fn into_response(self) -> Response {
        self.response
    }

    /// Wait for the background cache write (if any) and return the response.
    /// The write's own outcome is not reported.
    pub async fn settle(self) -> Response {
        let FetchOutcome { response, pending_write, .. } = self;
        if let Some(handle) = pending_write {
            let _ = handle.await;
        }
        response
    }
}

/// The cache proxy.
pub struct CacheProxy<S, N> {
    config: ProxyConfig,
    assets: AssetMatcher,
    storage: Arc<S>,
    network: Arc<N>,
    control: Arc<dyn ClientControl>,
}

impl<S: CacheStorage, N: Network> CacheProxy<S, N> {
    pub fn new(config: ProxyConfig, storage: Arc<S>, network: Arc<N>, control: Arc<dyn ClientControl>) -> Self {
        let assets = AssetMatcher::new(config.asset_markers.iter().cloned());
        Self { config, assets, storage, network, control }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    /// Whether every precache URL is already present in the current store,
    /// i.e. this generation was installed by an earlier run.
    pub async fn is_precached(&self) -> Result<bool, Error> {
        if !self.storage.has(self.cache_name()).await? {
            return Ok(false);
        }
        for url in &self.config.precache {
            let request = Request::get(url.clone());
            if self.storage.match_request(self.cache_name(), &request).await?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn fetch_precache_entry(&self, url: &Url) -> Result<(Request, Response), Error> {
        let request = Request::get(url.clone());
        let failed = |reason: String| Error::PrecacheFailed { url: url.to_string(), reason };

        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.is_ok() {
            return Err(failed(format!("status {}", response.status)));
        }
        Ok((request, response))
    }

    fn spawn_cache_write(&self, request: Request, response: Response) -> JoinHandle<()> {
        let storage = Arc::clone(&self.storage);
        let store = self.config.cache_name.clone();
        tokio::spawn(async move {
            match storage.put(&store, &request, &response).await {
                Ok(()) => tracing::debug!(store = %store, url = %request.url(), "cached asset"),
                // never surfaced to the caller
                Err(e) => tracing::debug!(store = %store, url = %request.url(), error = %e, "asset cache write failed"),
            }
        })
    }
}

#[async_trait]
impl<S: CacheStorage, N: Network> LifecycleHandler for CacheProxy<S, N> {
    async fn on_install(&self) -> Result<(), Error> {
        self.control.skip_waiting();

        let store = self.cache_name();
        self.storage.open(store).await?;

        let entries = try_join_all(self.config.precache.iter().map(|url| self.fetch_precache_entry(url))).await?;
        self.storage.put_all(store, &entries).await?;

        tracing::info!(store, entries = entries.len(), "precache installed");
        Ok(())
    }

    async fn on_activate(&self) -> Result<(), Error> {
        let current = self.cache_name();
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != current)
            .collect();

        let deleted = try_join_all(stale.iter().map(|name| self.storage.delete(name))).await?;
        for (name, existed) in stale.iter().zip(deleted) {
            tracing::info!(store = %name, existed, "deleted stale cache store");
        }

        self.control.claim();
        Ok(())
    }

    async fn on_fetch(&self, request: Request) -> Result<FetchOutcome, Error> {
        let store = self.cache_name();

        if request.is_get() {
            match self.storage.match_request(store, &request).await {
                Ok(Some(response)) => {
                    tracing::debug!(url = %request.url(), "cache hit");
                    return Ok(FetchOutcome { response, source: ResponseSource::Cache, pending_write: None });
                }
                Ok(None) => tracing::debug!(url = %request.url(), "cache miss"),
                Err(e) => tracing::debug!(url = %request.url(), error = %e, "cache lookup failed; treating as miss"),
            }
        }

        let response = self.network.fetch(&request).await?;

        let cacheable = request.is_get() && response.is_ok() && self.assets.matches(request.url().as_str());
        let pending_write = if cacheable && response.body.len() > self.config.max_entry_bytes {
            tracing::debug!(
                url = %request.url(),
                bytes = response.body.len(),
                limit = self.config.max_entry_bytes,
                "asset too large to cache"
            );
            None
        } else {
            cacheable.then(|| self.spawn_cache_write(request, response.clone()))
        };

        Ok(FetchOutcome { response, source: ResponseSource::Network, pending_write })
    }
}
