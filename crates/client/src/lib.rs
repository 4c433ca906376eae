//! Client code for aramaps-cache.
//!
//! This crate provides the network fetch primitive and the cache proxy that
//! sits between the map application and the network.

pub mod fetch;
pub mod proxy;

pub use fetch::{FetchClient, FetchConfig, Network, UrlError, resolve};
pub use proxy::{
    AssetMatcher, CacheProxy, ClientControl, FetchOutcome, HostControl, LifecycleHandler, ProxyConfig, Registration,
    ResponseSource, WorkerState,
};
