//! Serply web search API (Google results over HTTP).

use std::time::Duration;

use serde::Deserialize;

use super::{SearchBackend, SearchError, SearchFuture, decode_body};

pub const DEFAULT_BASE_URL: &str = "https://api.serply.io";

/// Serply search backend, authenticated with a static API key.
pub struct Serply {
    pub api_key: String,
    pub base_url: String,
}

impl Serply {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/v1/search/q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }
}

#[derive(Debug, Deserialize)]
struct SerplyResponse {
    results: Vec<SerplyResult>,
}

#[derive(Debug, Deserialize)]
struct SerplyResult {
    link: String,
}

/// Decode a Serply response into its result links, in ranked order.
pub async fn parse_response(resp: reqwest::Response) -> Result<Vec<String>, SearchError> {
    let data: SerplyResponse = decode_body(resp).await?;
    Ok(data.results.into_iter().map(|r| r.link).collect())
}

impl SearchBackend for Serply {
    fn name(&self) -> &str {
        "Serply"
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
                .header("Content-Type", "application/json")
                .header("X-User-Agent", "")
                .header("X-Proxy-Location", "")
                .header("X-Api-Key", &self.api_key)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| SearchError::Transport(e.to_string()))?;
            parse_response(resp).await
        })
    }
}
