//! aramaps-cache server entry point.
//!
//! Boots the offline cache worker (see [`worker::start`]) and then serves
//! MCP on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use aramaps_client::{FetchClient, FetchConfig, ProxyConfig};
use aramaps_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;
mod worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let origin = config.origin_url()?;
    tracing::info!(cache_name = %config.cache_name, origin = %origin, db_path = %config.db_path.display(), "Starting aramaps-cache");

    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(&config))?;
    let worker = worker::start(ProxyConfig::from_app(&config)?, &cache, Arc::new(network))
        .await
        .context("starting cache worker")?;

    let handler = handler::AramapsCacheServer::new(Arc::new(worker), cache, origin);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
