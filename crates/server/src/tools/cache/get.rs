//! cache_get tool implementation.
//!
//! Looks up one request in the current cache store without touching the
//! network.

use aramaps_client::resolve;
use aramaps_core::{CacheDb, Error, Request};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL of the cached GET request. Relative paths resolve against the
    /// application origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    /// SHA-256 of the method and URL.
    pub key_hash: String,
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: usize,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(
    cache: &CacheDb, store: &str, origin: &Url, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve(origin, &params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let entry = cache
        .get_entry(store, &Request::get(url.clone()))
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    let content_type = entry.response.content_type().map(str::to_string);
    let output = CacheGetOutput {
        store: entry.store,
        key_hash: entry.key_hash,
        url: entry.request.url().to_string(),
        final_url: entry.response.url,
        status: entry.response.status,
        content_type,
        bytes: entry.response.body.len(),
        stored_at: entry.stored_at,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize entry: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
