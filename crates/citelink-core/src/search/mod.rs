//! Web search backends used when an entry carries no embedded link.

pub mod mock;
pub mod searxng;
pub mod serply;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::normalize::LinkRules;

pub use searxng::Searxng;
pub use serply::Serply;

/// Why a search request produced no usable result list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("rate limited (429)")]
    RateLimited,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Schema(String),
}

/// Boxed future returned by [`SearchBackend::search`].
pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<String>, SearchError>> + Send + 'a>>;

/// A free-text web search that returns candidate URLs in ranked order.
pub trait SearchBackend: Send + Sync {
    /// Human-readable backend name (e.g. "Serply").
    fn name(&self) -> &str;

    /// Run one search for `query`.
    fn search<'a>(
        &'a self,
        query: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SearchFuture<'a>;
}

/// Map a non-success response to a [`SearchError`].
pub fn check_response_status(resp: &reqwest::Response) -> Result<(), SearchError> {
    let status = resp.status();
    if status.as_u16() == 429 {
        Err(SearchError::RateLimited)
    } else if !status.is_success() {
        Err(SearchError::Status(status.as_u16()))
    } else {
        Ok(())
    }
}

/// Read the body and decode it as `T`, reporting shape mismatches as
/// [`SearchError::Schema`].
pub(crate) async fn decode_body<T>(resp: reqwest::Response) -> Result<T, SearchError>
where
    T: serde::de::DeserializeOwned,
{
    check_response_status(&resp)?;
    let body = resp
        .text()
        .await
        .map_err(|e| SearchError::Transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| SearchError::Schema(e.to_string()))
}

/// Search for `query` and return the normalized candidate URLs.
pub async fn search_links(
    backend: &dyn SearchBackend,
    client: &reqwest::Client,
    query: &str,
    timeout: Duration,
    rules: &LinkRules,
) -> Result<Vec<String>, SearchError> {
    let raw = backend.search(query, client, timeout).await?;
    let links = rules.apply(raw);
    tracing::debug!(backend = backend.name(), query, results = links.len(), "search complete");
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::mock::{MockResponse, MockSearch};

    fn response(status: u16, body: &str) -> reqwest::Response {
        let http_resp = http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap();
        reqwest::Response::from(http_resp)
    }

    #[test]
    fn ok_on_200() {
        assert!(check_response_status(&response(200, "")).is_ok());
    }

    #[test]
    fn rate_limited_on_429() {
        assert_eq!(
            check_response_status(&response(429, "")),
            Err(SearchError::RateLimited)
        );
    }

    #[test]
    fn server_error_reports_status() {
        assert_eq!(
            check_response_status(&response(503, "")),
            Err(SearchError::Status(503))
        );
    }

    #[tokio::test]
    async fn decode_rejects_malformed_json() {
        let err = decode_body::<serde_json::Value>(response(200, "<html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(_)));
    }

    #[tokio::test]
    async fn search_links_normalizes_backend_output() {
        let backend = MockSearch::new(MockResponse::Links(vec![
            "https://scholar.google.com/citations?x".into(),
            "https://arxiv.org/abs/1706.03762".into(),
        ]));
        let client = reqwest::Client::new();
        let links = search_links(
            &backend,
            &client,
            "Attention is all you need",
            Duration::from_secs(1),
            &LinkRules::default(),
        )
        .await
        .unwrap();
        assert_eq!(links, vec!["https://arxiv.org/pdf/1706.03762".to_string()]);
        assert_eq!(backend.queries(), vec!["Attention is all you need".to_string()]);
    }

    #[tokio::test]
    async fn search_links_propagates_backend_error() {
        let backend = MockSearch::new(MockResponse::Error(SearchError::Status(500)));
        let client = reqwest::Client::new();
        let err = search_links(
            &backend,
            &client,
            "anything",
            Duration::from_secs(1),
            &LinkRules::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, SearchError::Status(500));
    }
}
