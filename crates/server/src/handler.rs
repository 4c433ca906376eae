//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, get_impl, stores_impl};
use crate::tools::{ProxyFetchParams, fetch_impl};

use aramaps_client::{CacheProxy, FetchClient, Registration};
use aramaps_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use url::Url;

/// The worker as the binary runs it: SQLite storage, reqwest network.
pub type Worker = Registration<CacheProxy<CacheDb, FetchClient>>;

/// The main MCP server handler for aramaps-cache.
#[derive(Clone)]
pub struct AramapsCacheServer {
    worker: Arc<Worker>,
    cache: CacheDb,
    origin: Url,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl AramapsCacheServer {
    /// Create a new server handler around an installed worker.
    pub fn new(worker: Arc<Worker>, cache: CacheDb, origin: Url) -> Self {
        Self { worker, cache, origin, tool_router: Self::tool_router() }
    }

    fn cache_name(&self) -> &str {
        self.worker.handler().cache_name()
    }

    /// Fetch a URL through the offline cache.
    ///
    /// Cached responses are served without touching the network. Misses go to
    /// the network, and successful tile, font and sprite responses are kept.
    #[tool(
        description = "Fetch a URL through the aramaps offline cache. Returns status, content type, whether it came from cache or network, and the body as text when possible."
    )]
    async fn proxy_fetch(&self, params: Parameters<ProxyFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&*self.worker, &self.origin, params.0).await
    }

    #[tool(description = "Look up a URL in the current cache store without going to the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.cache, self.cache_name(), &self.origin, params.0).await
    }

    #[tool(description = "List cache stores with entry counts, the current cache name, and the worker state.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.cache, self.cache_name(), self.worker.state().await).await
    }
}

impl ServerHandler for AramapsCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "aramaps-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
