//! Anchor → bibliography entry → URL.

use std::ops::Range;
use std::sync::Arc;

use crate::destination::{self, Destination};
use crate::layout::PositionedFragment;
use crate::link_match::find_entry_link;
use crate::page_locator::locate_pages;
use crate::search::{SearchBackend, search_links};
use crate::span::{SpanHeuristics, find_entry_span};
use crate::text::build_entry_text;
use crate::viewer::DocumentViewer;
use crate::{CitationSource, Config, ResolveError, ResolvedCitation};

/// Everything learned about an anchor's bibliography entry, short of
/// searching the web for it.
#[derive(Debug, Clone)]
pub struct EntryReport {
    pub anchor: String,
    pub destination: Destination,
    /// 1-based page the destination points into.
    pub page: usize,
    /// Span over the primary page's fragments followed by the next page's.
    pub span: Range<usize>,
    pub fragments: Vec<PositionedFragment>,
    /// URL of a link annotation overlapping the entry on the primary page.
    pub embedded_link: Option<String>,
    pub citation_text: String,
}

/// Resolves citation anchors of one open document.
#[derive(Clone)]
pub struct CitationResolver {
    viewer: Arc<dyn DocumentViewer>,
    search: Arc<dyn SearchBackend>,
    client: reqwest::Client,
    config: Config,
}

impl CitationResolver {
    pub fn new(
        viewer: Arc<dyn DocumentViewer>,
        search: Arc<dyn SearchBackend>,
        config: Config,
    ) -> Self {
        Self {
            viewer,
            search,
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Locate the entry for `anchor` and extract its link and text without
    /// issuing a search request.
    pub async fn inspect(&self, anchor: &str) -> Result<EntryReport, ResolveError> {
        inspect_entry(self.viewer.as_ref(), &self.config.heuristics, anchor).await
    }

    /// Resolve `anchor` (the URL fragment after `#`, possibly
    /// percent-encoded) to the cited work's URL.
    ///
    /// An embedded link wins; otherwise the entry text is searched and the
    /// first normalized result is used.
    pub async fn resolve(&self, anchor: &str) -> Result<ResolvedCitation, ResolveError> {
        let report = self.inspect(anchor).await?;

        if let Some(url) = report.embedded_link {
            tracing::info!(anchor = %report.anchor, url = %url, "resolved from embedded link");
            return Ok(ResolvedCitation {
                url,
                source: CitationSource::Metadata,
                citation_text: report.citation_text,
                search_results: vec![],
            });
        }

        if report.citation_text.is_empty() {
            return Err(ResolveError::EmptyCitationText);
        }

        let results = search_links(
            self.search.as_ref(),
            &self.client,
            &report.citation_text,
            self.config.search_timeout(),
            &self.config.link_rules,
        )
        .await
        .inspect_err(|e| {
            tracing::warn!(backend = self.search.name(), error = %e, "search failed");
        })?;

        let url = results
            .first()
            .cloned()
            .ok_or_else(|| ResolveError::NoResultsFound(report.citation_text.clone()))?;
        tracing::info!(anchor = %report.anchor, url = %url, "resolved from search");

        Ok(ResolvedCitation {
            url,
            source: CitationSource::Search,
            citation_text: report.citation_text,
            search_results: results,
        })
    }
}

/// Locate the entry for `anchor` in `viewer` and extract its embedded link
/// and citation text.
pub async fn inspect_entry(
    viewer: &dyn DocumentViewer,
    heuristics: &SpanHeuristics,
    anchor: &str,
) -> Result<EntryReport, ResolveError> {
    let anchor = urlencoding::decode(anchor)
        .map_err(|_| ResolveError::InvalidDestination(anchor.to_string()))?
        .into_owned();

    let raw = viewer
        .destination(&anchor)
        .await?
        .ok_or_else(|| ResolveError::InvalidDestination(anchor.clone()))?;
    let destination = destination::interpret(&raw)?;
    tracing::debug!(
        anchor = %anchor,
        mode = ?destination.mode,
        x = destination.target.x,
        y = destination.target.y,
        "decoded destination"
    );

    let pages = locate_pages(viewer, destination.page_ref).await?;

    let mut fragments = viewer.text_content(pages.primary).await?;
    if let Some(next) = pages.next {
        fragments.extend(viewer.text_content(next).await?);
    }
    // Next-page annotations are not consulted.
    let annotations = viewer.annotations(pages.primary).await?;

    let span = find_entry_span(&fragments, destination.target, heuristics).map_err(|e| match e {
        ResolveError::EntryNotFound(_) => ResolveError::EntryNotFound(raw.to_string()),
        other => other,
    })?;
    let entry = &fragments[span.clone()];

    let embedded_link = find_entry_link(entry, &annotations).map(str::to_string);
    let citation_text = build_entry_text(entry);

    Ok(EntryReport {
        anchor,
        destination,
        page: pages.primary,
        span,
        fragments,
        embedded_link,
        citation_text,
    })
}
