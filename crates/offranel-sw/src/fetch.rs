//! Fetch types and the network seam.
//!
//! The worker never talks to the network directly; it goes through the
//! [`RemoteFetch`] trait so the cache-first policy can be pinned in tests
//! with a counting mock. [`HttpFetch`] is the real implementation on top of
//! `reqwest`, resolving the site-relative precache paths against a base URL.

use bytes::Bytes;
use futures::future::BoxFuture;
use hashbrown::HashMap;
use offranel_common::{OffranelError, Result};
use tracing::trace;
use url::Url;

use crate::cache::CacheEntry;

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Request URL (site-relative or absolute).
    pub url: String,

    /// HTTP method.
    pub method: String,

    /// Whether this is a top-level navigation.
    pub is_navigation: bool,
}

impl FetchRequest {
    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            is_navigation: false,
        }
    }

    /// Create a navigation request.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            is_navigation: true,
        }
    }
}

/// A response, from cache or network.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Status code.
    pub status: u16,

    /// Status text.
    pub status_text: String,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// Response body.
    pub body: Bytes,

    /// Whether served from the cache store.
    pub from_cache: bool,
}

impl FetchResponse {
    /// Create a successful response with a body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            headers: HashMap::new(),
            body: body.into(),
            from_cache: false,
        }
    }

    /// Re-materialize a response from a cache entry.
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            status: entry.status,
            status_text: "OK".to_string(),
            headers: entry.headers.clone(),
            body: entry.body.clone(),
            from_cache: true,
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network seam the worker fetches through.
///
/// Boxed futures keep the trait object-safe so the worker can hold an
/// `Arc<dyn RemoteFetch>`.
pub trait RemoteFetch: Send + Sync {
    /// Perform a real network fetch for the URL.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse>>;
}

/// `reqwest`-backed network layer.
pub struct HttpFetch {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetch {
    /// Create a fetcher resolving site-relative paths against `base`.
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    /// Create a fetcher with a preconfigured client.
    pub fn with_client(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        self.base
            .join(url)
            .map_err(|e| OffranelError::network_with_source(format!("invalid URL {url}"), e))
    }
}

impl RemoteFetch for HttpFetch {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse>> {
        Box::pin(async move {
            let absolute = self.resolve(url)?;
            trace!(url = %absolute, "network fetch");

            let response = self
                .client
                .get(absolute)
                .send()
                .await
                .map_err(|e| OffranelError::network_with_source(format!("GET {url} failed"), e))?;

            let status = response.status();
            let mut headers = HashMap::new();
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    headers.insert(name.as_str().to_string(), value.to_string());
                }
            }

            let body = response.bytes().await.map_err(|e| {
                OffranelError::network_with_source(format!("reading body of {url} failed"), e)
            })?;

            Ok(FetchResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                headers,
                body,
                from_cache: false,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_response_is_success() {
        assert!(FetchResponse::ok("x").is_success());

        let mut not_found = FetchResponse::ok("");
        not_found.status = 404;
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_response_round_trips_through_entry() {
        let mut response = FetchResponse::ok("body{}");
        response
            .headers
            .insert("content-type".to_string(), "text/css".to_string());

        let entry = CacheEntry::from_response("/static/css/style.css", &response);
        let restored = FetchResponse::from_entry(&entry);

        assert_eq!(restored.status, 200);
        assert_eq!(restored.body, response.body);
        assert!(restored.from_cache);
        assert_eq!(
            restored.headers.get("content-type").map(String::as_str),
            Some("text/css")
        );
    }

    #[tokio::test]
    async fn test_http_fetch_resolves_relative_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/css/style.css"))
            .respond_with(ResponseTemplate::new(200).set_body_string("body{}"))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).expect("mock server URI");
        let fetcher = HttpFetch::new(base);

        let response = fetcher.fetch("/static/css/style.css").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from_static(b"body{}"));
        assert!(!response.from_cache);
    }

    #[tokio::test]
    async fn test_http_fetch_maps_transport_errors() {
        // Port from a server that has been shut down: connection refused.
        let server = MockServer::start().await;
        let base = Url::parse(&server.uri()).expect("mock server URI");
        drop(server);

        let fetcher = HttpFetch::new(base);
        let err = fetcher.fetch("/").await.unwrap_err();
        assert_eq!(err.category(), "network");
    }
}
