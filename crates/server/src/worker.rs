//! Worker startup.
//!
//! A fresh generation is installed; one already stored by an earlier run is
//! resumed without touching the network. When install fails and an older
//! generation still holds entries, that generation keeps serving.

use std::sync::Arc;

use aramaps_client::{CacheProxy, HostControl, Network, ProxyConfig, Registration};
use aramaps_core::{CacheDb, Error};

fn register<N: Network>(config: ProxyConfig, cache: &CacheDb, network: Arc<N>) -> Registration<CacheProxy<CacheDb, N>> {
    let control = Arc::new(HostControl::new());
    let proxy = CacheProxy::new(config, Arc::new(cache.clone()), network, control.clone());
    Registration::new(Arc::new(proxy), control)
}

/// Most recently created non-empty store other than `current`.
async fn previous_generation(cache: &CacheDb, current: &str) -> Result<Option<String>, Error> {
    for name in cache.store_names().await?.into_iter().rev() {
        if name != current && cache.entry_count(&name).await? > 0 {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

/// Bring up an activated worker for `config`.
///
/// # Errors
///
/// Returns the install error when install fails and no previous
/// generation is left to fall back to.
pub async fn start<N: Network>(
    config: ProxyConfig, cache: &CacheDb, network: Arc<N>,
) -> Result<Registration<CacheProxy<CacheDb, N>>, Error> {
    let worker = register(config.clone(), cache, Arc::clone(&network));
    if worker.handler().is_precached().await? {
        worker.resume().await?;
        return Ok(worker);
    }

    let err = match worker.install().await {
        Ok(()) => return Ok(worker),
        Err(e) => e,
    };
    let Some(previous) = previous_generation(cache, &config.cache_name).await? else {
        return Err(err);
    };

    tracing::warn!(error = %err, store = %previous, "install failed; serving previous cache generation");
    let fallback = register(ProxyConfig { cache_name: previous, ..config }, cache, network);
    fallback.resume().await?;
    Ok(fallback)
}
