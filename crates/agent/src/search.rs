//! Web-search adapters.

use std::sync::Arc;

use async_trait::async_trait;
use brickwise_core::config::{exposed_key, SearchConfig, SearchProvider};
use brickwise_core::errors::{ServiceError, ServiceKind};
use brickwise_core::search::{SearchHit, SearchResponse};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::{http_client, post_json};

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Ranked results for `query`. The response always echoes `query`.
    async fn search(&self, query: &str) -> Result<SearchResponse, ServiceError>;
}

const SERVICE: ServiceKind = ServiceKind::Search;

/// Builds the configured provider once at startup.
pub fn search_client_from_config(
    config: &SearchConfig,
) -> Result<Arc<dyn SearchClient>, ServiceError> {
    let Some(api_key) = exposed_key(config.api_key.as_ref()) else {
        return Err(ServiceError::Unavailable {
            service: SERVICE,
            reason: format!(
                "no api key configured (set BRICKWISE_SEARCH_API_KEY or {})",
                config.provider.vendor_key_var()
            ),
        });
    };

    let client: Arc<dyn SearchClient> = match config.provider {
        SearchProvider::Tavily => Arc::new(
            TavilyClient::new(api_key, config.timeout_secs)?
                .with_base_url(config.effective_base_url())
                .with_max_results(config.max_results),
        ),
        SearchProvider::Serper => Arc::new(
            SerperClient::new(api_key, config.timeout_secs)?
                .with_base_url(config.effective_base_url())
                .with_max_results(config.max_results),
        ),
    };
    Ok(client)
}

#[derive(Clone, Debug)]
pub struct TavilyClient {
    base_url: String,
    api_key: SecretString,
    max_results: u32,
    http: Client,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: SearchProvider::Tavily.default_base_url().to_string(),
            api_key: SecretString::from(api_key.into()),
            max_results: 5,
            http: http_client(SERVICE, timeout_secs)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, ServiceError> {
        debug!(event_name = "adapter.search.request", provider = "tavily", %query, "sending search request");

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let body = TavilyRequest {
            api_key: self.api_key.expose_secret(),
            query,
            max_results: self.max_results,
        };
        let response: TavilyResponse = post_json(SERVICE, self.http.post(url), &body).await?;

        let hits = response
            .results
            .into_iter()
            .map(|result| SearchHit::new(result.title, result.url, result.content))
            .collect();
        Ok(SearchResponse::new(query, hits))
    }
}

#[derive(Clone, Debug)]
pub struct SerperClient {
    base_url: String,
    api_key: SecretString,
    max_results: u32,
    http: Client,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: SearchProvider::Serper.default_base_url().to_string(),
            api_key: SecretString::from(api_key.into()),
            max_results: 5,
            http: http_client(SERVICE, timeout_secs)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, ServiceError> {
        debug!(event_name = "adapter.search.request", provider = "serper", %query, "sending search request");

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let request = self.http.post(url).header("X-API-KEY", self.api_key.expose_secret());
        let body = SerperRequest { q: query, num: self.max_results };
        let response: SerperResponse = post_json(SERVICE, request, &body).await?;

        let hits = response
            .organic
            .into_iter()
            .map(|result| SearchHit::new(result.title, result.link, result.snippet))
            .collect();
        Ok(SearchResponse::new(query, hits))
    }
}

#[cfg(test)]
mod tests {
    use brickwise_core::config::{SearchConfig, SearchProvider};
    use brickwise_core::errors::{ServiceError, ServiceKind};
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::search::{search_client_from_config, SearchClient, SerperClient, TavilyClient};

    #[tokio::test]
    async fn tavily_maps_results_and_echoes_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/search").json_body(json!({
                "api_key": "tvly-test",
                "query": "current price of bricks in India 2025",
                "max_results": 3
            }));
            then.status(200).json_body(json!({
                "query": "something the service rewrote",
                "results": [
                    { "title": "Brick rates", "url": "https://example.test/a", "content": "₹9 per brick", "score": 0.9 },
                    { "title": "Market", "url": "https://example.test/b", "content": "Prices steady" }
                ]
            }));
        });

        let client = match TavilyClient::new("tvly-test", 5) {
            Ok(client) => client.with_base_url(server.url("")).with_max_results(3),
            Err(error) => panic!("client should build: {error}"),
        };
        let response = client.search("current price of bricks in India 2025").await;

        mock.assert();
        let response = match response {
            Ok(response) => response,
            Err(error) => panic!("search should succeed: {error}"),
        };
        assert_eq!(response.query, "current price of bricks in India 2025");
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].content, "₹9 per brick");
        assert_eq!(response.results[1].url, "https://example.test/b");
    }

    #[tokio::test]
    async fn serper_sends_key_header_and_maps_organic_results() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/search")
                .header("X-API-KEY", "serper-test")
                .json_body(json!({ "q": "permits", "num": 5 }));
            then.status(200).json_body(json!({
                "searchParameters": { "q": "permits" },
                "organic": [{ "title": "Permits", "link": "https://example.test/p", "snippet": "Building permit required" }]
            }));
        });

        let client = match SerperClient::new("serper-test", 5) {
            Ok(client) => client.with_base_url(server.url("")),
            Err(error) => panic!("client should build: {error}"),
        };
        let response = client.search("permits").await;

        mock.assert();
        let snippets: Vec<String> = response
            .map(|response| response.snippets().map(str::to_owned).collect())
            .unwrap_or_default();
        assert_eq!(snippets, vec!["Building permit required".to_string()]);
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(401).body("unauthorized");
        });

        let client = match TavilyClient::new("bad-key", 5) {
            Ok(client) => client.with_base_url(server.url("")),
            Err(error) => panic!("client should build: {error}"),
        };

        assert_eq!(
            client.search("anything").await,
            Err(ServiceError::Status { service: ServiceKind::Search, status: 401 })
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let client = match TavilyClient::new("tvly-test", 1) {
            Ok(client) => client.with_base_url("http://127.0.0.1:9"),
            Err(error) => panic!("client should build: {error}"),
        };

        assert!(matches!(client.search("anything").await, Err(ServiceError::Transport { .. })));
    }

    #[test]
    fn keys_stay_out_of_debug_output() {
        let tavily = TavilyClient::new("tvly-hidden-key", 5).map(|client| format!("{client:?}"));
        let serper = SerperClient::new("serper-hidden-key", 5).map(|client| format!("{client:?}"));

        for rendered in [tavily, serper] {
            let rendered = rendered.unwrap_or_default();
            assert!(rendered.contains("api_key"));
            assert!(!rendered.contains("hidden-key"));
        }
    }

    #[test]
    fn missing_key_fails_initialization() {
        let config = SearchConfig {
            provider: SearchProvider::Serper,
            api_key: None,
            base_url: None,
            timeout_secs: 5,
            max_results: 5,
        };

        match search_client_from_config(&config) {
            Err(error) => {
                assert!(error.is_unavailable());
                assert!(error.to_string().contains("SERPER_API_KEY"));
            }
            Ok(_) => panic!("a missing key should not initialize the client"),
        }
    }
}
