//! SearxNG metasearch backend.
//!
//! Queries a self-hosted SearxNG instance through its JSON API. Useful when
//! no commercial search key is available; the instance must have the `json`
//! output format enabled.

use std::time::Duration;

use serde::Deserialize;

use super::{SearchBackend, SearchError, SearchFuture, decode_body};

/// SearxNG web search backend.
pub struct Searxng {
    /// Base URL of the SearxNG instance (e.g., "http://localhost:8080")
    pub base_url: String,
}

impl Searxng {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&format=json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }
}

/// Response from SearxNG JSON API.
#[derive(Debug, Deserialize)]
struct SearxngResponse {
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    url: String,
}

pub async fn parse_response(resp: reqwest::Response) -> Result<Vec<String>, SearchError> {
    let data: SearxngResponse = decode_body(resp).await?;
    Ok(data.results.into_iter().map(|r| r.url).collect())
}

impl SearchBackend for Searxng {
    fn name(&self) -> &str {
        "SearxNG"
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> SearchFuture<'a> {
        Box::pin(async move {
            let resp = client
                .get(self.search_url(query))
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| SearchError::Transport(e.to_string()))?;
            parse_response(resp).await
        })
    }
}
