use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub mod config_file;
pub mod destination;
pub mod layout;
pub mod link_match;
pub mod normalize;
pub mod page_locator;
pub mod resolver;
pub mod scan;
pub mod search;
pub mod span;
pub mod text;
pub mod viewer;

// Re-export for convenience
pub use destination::{Destination, LinkMode, PageRef, RawDestination};
pub use layout::{LinkAnnotation, PositionedFragment, TargetPoint};
pub use normalize::{LinkRules, Rewrite};
pub use resolver::{CitationResolver, EntryReport, inspect_entry};
pub use search::{SearchBackend, SearchError};
pub use span::SpanHeuristics;
pub use viewer::{DocumentViewer, ViewerError};

/// Why a citation could not be resolved. Every variant ends the attempt.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{0} is an invalid link")]
    InvalidDestination(String),
    #[error("unrecognized link mode: {0}")]
    UnrecognizedLinkMode(String),
    #[error("no page with reference {0}")]
    PageNotFound(u32),
    #[error("couldn't find bibliography entry at {0}")]
    EntryNotFound(String),
    #[error("bibliography entry has no searchable text")]
    EmptyCitationText,
    #[error("search unavailable: {0}")]
    SearchUnavailable(#[from] SearchError),
    #[error("found no results for \"{0}\"")]
    NoResultsFound(String),
    #[error("viewer error: {0}")]
    Viewer(#[from] ViewerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no Serply API key configured (set SERPLY_API_KEY or search.api_key)")]
    MissingApiKey,
    #[error("no SearxNG URL configured (set SEARXNG_URL or search.searxng_url)")]
    MissingSearxngUrl,
    #[error("unknown search backend \"{0}\" (expected serply or searxng)")]
    UnknownBackend(String),
}

/// Where the resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationSource {
    /// A link annotation embedded in the entry itself.
    Metadata,
    /// The top web search result for the entry text.
    Search,
}

impl fmt::Display for CitationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationSource::Metadata => f.write_str("metadata"),
            CitationSource::Search => f.write_str("search"),
        }
    }
}

/// The outcome of one successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCitation {
    pub url: String,
    pub source: CitationSource,
    /// Reconstructed entry text; used as the search query when searching.
    pub citation_text: String,
    /// All normalized search results, best first. Empty for metadata links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<String>,
}

/// Which web search service to fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchBackendKind {
    #[default]
    Serply,
    Searxng,
}

impl std::str::FromStr for SearchBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serply" => Ok(Self::Serply),
            "searxng" => Ok(Self::Searxng),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Configuration for citation resolution.
#[derive(Clone)]
pub struct Config {
    pub search_backend: SearchBackendKind,
    pub serply_api_key: Option<String>,
    /// Override for the Serply API host (e.g. a proxy).
    pub serply_base_url: Option<String>,
    /// SearxNG base URL (e.g., "http://localhost:8080").
    pub searxng_url: Option<String>,
    pub search_timeout_secs: u64,
    pub heuristics: SpanHeuristics,
    pub link_rules: LinkRules,
    /// Period of the link scanner's rescan.
    pub scan_interval_ms: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("search_backend", &self.search_backend)
            .field("serply_api_key", &self.serply_api_key.as_ref().map(|_| "***"))
            .field("serply_base_url", &self.serply_base_url)
            .field("searxng_url", &self.searxng_url)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("heuristics", &self.heuristics)
            .field("link_rules", &self.link_rules)
            .field("scan_interval_ms", &self.scan_interval_ms)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_backend: SearchBackendKind::Serply,
            serply_api_key: None,
            serply_base_url: None,
            searxng_url: None,
            search_timeout_secs: 10,
            heuristics: SpanHeuristics::default(),
            link_rules: LinkRules::default(),
            scan_interval_ms: 500,
        }
    }
}

impl Config {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms.max(1))
    }

    /// Build the configured search backend.
    pub fn build_search_backend(&self) -> Result<Arc<dyn SearchBackend>, ConfigError> {
        match self.search_backend {
            SearchBackendKind::Serply => {
                let key = self
                    .serply_api_key
                    .clone()
                    .ok_or(ConfigError::MissingApiKey)?;
                let mut serply = search::Serply::new(key);
                if let Some(base) = &self.serply_base_url {
                    serply = serply.with_base_url(base.clone());
                }
                Ok(Arc::new(serply))
            }
            SearchBackendKind::Searxng => {
                let url = self
                    .searxng_url
                    .clone()
                    .ok_or(ConfigError::MissingSearxngUrl)?;
                Ok(Arc::new(search::Searxng::new(url)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = Config {
            serply_api_key: Some("secret-key".into()),
            ..Config::default()
        };
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn serply_requires_api_key() {
        let err = Config::default().build_search_backend().err().unwrap();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn searxng_backend_from_url() {
        let config = Config {
            search_backend: SearchBackendKind::Searxng,
            searxng_url: Some("http://localhost:8080".into()),
            ..Config::default()
        };
        let backend = config.build_search_backend().unwrap();
        assert_eq!(backend.name(), "SearxNG");
    }

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!("Serply".parse::<SearchBackendKind>().unwrap(), SearchBackendKind::Serply);
        assert_eq!("SEARXNG".parse::<SearchBackendKind>().unwrap(), SearchBackendKind::Searxng);
        assert!("bing".parse::<SearchBackendKind>().is_err());
    }

    #[test]
    fn source_serializes_lowercase() {
        let resolved = ResolvedCitation {
            url: "https://x".into(),
            source: CitationSource::Metadata,
            citation_text: "A paper".into(),
            search_results: vec![],
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["source"], "metadata");
        assert!(json.get("search_results").is_none());
    }
}
