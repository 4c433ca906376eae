//! Request and response values exchanged between the proxy, the cache
//! storage and the network.
//!
//! These are plain owned values rather than reqwest types so that cache
//! storage backends and test doubles do not depend on an HTTP client.

use bytes::Bytes;
use url::Url;

/// A request as seen by the proxy.
///
/// Identity for caching purposes is the method together with the URL.
/// Fragments never reach the network, so they are dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    method: String,
    url: Url,
}

impl Request {
    /// Build a request with an arbitrary method. The method is upper-cased.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url }
    }

    /// Build a GET request.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Only GET requests may be looked up in or written to a cache store.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response, either fresh from the network or read back from a store.
///
/// The body is reference counted, so cloning a response to hand one copy to
/// the caller and another to the cache does not copy the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The URL the response was served from (after redirects).
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers in the order they were received.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    /// Append a header, returning the response for chaining.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is in the 2xx success range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
