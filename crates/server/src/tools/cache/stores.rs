//! cache_stores tool implementation.
//!
//! Lists every cache store with its entry count, marking the current one.

use aramaps_client::WorkerState;
use aramaps_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreInfo {
    pub name: String,
    pub entries: u64,
    /// Whether this store matches the active cache name.
    pub current: bool,
}

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// The active cache name.
    pub cache_name: String,
    /// Lifecycle state of the worker.
    pub state: String,
    pub stores: Vec<StoreInfo>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(cache: &CacheDb, cache_name: &str, state: WorkerState) -> Result<CallToolResult, McpError> {
    let mut stores = Vec::new();
    for name in cache.store_names().await? {
        let entries = cache.entry_count(&name).await?;
        let current = name == cache_name;
        stores.push(StoreInfo { name, entries, current });
    }

    let output = CacheStoresOutput { cache_name: cache_name.to_string(), state: state.to_string(), stores };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
