//! Mock search backend for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{SearchBackend, SearchError, SearchFuture};

/// A configurable mock response for [`MockSearch`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return these links, unnormalized.
    Links(Vec<String>),
    /// Fail the request.
    Error(SearchError),
}

/// A hand-rolled mock implementing [`SearchBackend`] for tests.
///
/// Returns a fixed response and records every query it receives.
pub struct MockSearch {
    response: MockResponse,
    queries: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockSearch {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            queries: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `search()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl SearchBackend for MockSearch {
    fn name(&self) -> &str {
        "Mock"
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> SearchFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        let response = self.response.clone();

        Box::pin(async move {
            match response {
                MockResponse::Links(links) => Ok(links),
                MockResponse::Error(err) => Err(err),
            }
        })
    }
}
