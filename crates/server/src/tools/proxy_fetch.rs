//! proxy_fetch tool implementation.
//!
//! Routes a request through the active worker, the same way the map
//! application's page loads go through it.

use aramaps_client::{LifecycleHandler, Registration, resolve};
use aramaps_core::{Error, Request};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters for the proxy_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyFetchParams {
    /// URL to fetch. Relative paths resolve against the application origin.
    pub url: String,

    /// HTTP method: GET (default) or HEAD. Requests carry no body, so
    /// other methods are rejected. Only GET responses are ever cached.
    #[serde(default = "default_method")]
    pub method: String,
}

/// Methods that need no request body.
const SUPPORTED_METHODS: &[&str] = &["GET", "HEAD"];

fn default_method() -> String {
    "GET".into()
}

/// Output from the proxy_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyFetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// The URL the response was served from (after redirects).
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// "cache" or "network".
    pub source: String,
    /// Body size in bytes.
    pub bytes: usize,
    /// Body as text, when it is valid UTF-8.
    pub body: Option<String>,
}

/// Implementation of the proxy_fetch tool.
///
/// Waits for any background cache write before answering so a following
/// `cache_get` observes it. The write's own outcome is not reported.
pub async fn fetch_impl<H: LifecycleHandler>(
    registration: &Registration<H>, origin: &Url, params: ProxyFetchParams,
) -> Result<CallToolResult, McpError> {
    let method = params.method.trim().to_ascii_uppercase();
    if !SUPPORTED_METHODS.contains(&method.as_str()) {
        return Err(Error::InvalidInput(format!("unsupported method {:?}: expected GET or HEAD", params.method)).into());
    }
    let url = resolve(origin, &params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let request = Request::new(&method, url.clone());

    let outcome = registration.fetch(request).await?;
    let source = outcome.source.as_str().to_string();
    let response = outcome.settle().await;

    tracing::info!(url = %url, status = response.status, source = %source, "proxy_fetch");

    let output = ProxyFetchOutput {
        url: url.to_string(),
        final_url: response.url.clone(),
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        source,
        bytes: response.body.len(),
        body: std::str::from_utf8(&response.body).ok().map(str::to_string),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
