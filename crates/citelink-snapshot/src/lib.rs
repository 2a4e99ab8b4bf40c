//! A [`DocumentViewer`] over a JSON snapshot of a viewer's document model.
//!
//! The snapshot mirrors what a PDF viewer exposes to scripts: named
//! destinations, each page's object reference, its text-content items and
//! its annotations.
//!
//! ```json
//! {
//!   "destinations": {
//!     "cite.vaswani2017": [{"num": 41, "gen": 0}, {"name": "XYZ"}, 72, 700, null]
//!   },
//!   "pages": [
//!     {
//!       "ref": {"num": 41, "gen": 0},
//!       "items": [{"str": "[12]", "transform": [9, 0, 0, 9, 72, 700], "width": 14, "height": 9}],
//!       "annotations": [{"subtype": "Link", "rect": [90, 686, 300, 699], "url": "https://..."}]
//!     }
//!   ]
//! }
//! ```
//!
//! Marked-content items (entries without a `str` field) are skipped, as are
//! annotations whose subtype is not `Link`.

use std::collections::BTreeMap;
use std::path::Path;

use citelink_core::viewer::ViewerFuture;
use citelink_core::{
    DocumentViewer, LinkAnnotation, PageRef, PositionedFragment, RawDestination, ViewerError,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("page {page}: malformed text item: {message}")]
    MalformedItem { page: usize, message: String },
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    destinations: BTreeMap<String, RawDestination>,
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(rename = "ref")]
    page_ref: PageRef,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Deserialize)]
struct RawAnnotation {
    subtype: Option<String>,
    rect: [f64; 4],
    url: Option<String>,
}

#[derive(Debug, Clone)]
struct SnapshotPage {
    page_ref: PageRef,
    fragments: Vec<PositionedFragment>,
    annotations: Vec<LinkAnnotation>,
}

/// A fully loaded document snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotDocument {
    destinations: BTreeMap<String, RawDestination>,
    pages: Vec<SnapshotPage>,
}

impl SnapshotDocument {
    /// Read and parse a snapshot file.
    pub fn open(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot = serde_json::from_str(json)?;

        let mut pages = Vec::with_capacity(raw.pages.len());
        for (idx, page) in raw.pages.into_iter().enumerate() {
            let mut fragments = Vec::with_capacity(page.items.len());
            for item in page.items {
                if item.get("str").is_none() {
                    continue;
                }
                let fragment = serde_json::from_value::<PositionedFragment>(item).map_err(|e| {
                    SnapshotError::MalformedItem {
                        page: idx + 1,
                        message: e.to_string(),
                    }
                })?;
                fragments.push(fragment);
            }

            let annotations = page
                .annotations
                .into_iter()
                .filter(|a| a.subtype.as_deref().is_none_or(|s| s == "Link"))
                .map(|a| LinkAnnotation::new(a.rect, a.url))
                .collect();

            pages.push(SnapshotPage {
                page_ref: page.page_ref,
                fragments,
                annotations,
            });
        }

        tracing::debug!(
            pages = pages.len(),
            destinations = raw.destinations.len(),
            "loaded document snapshot"
        );
        Ok(Self {
            destinations: raw.destinations,
            pages,
        })
    }

    /// Named destinations, in sorted order.
    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.destinations.keys().map(String::as_str)
    }

    fn page(&self, page_number: usize) -> Result<&SnapshotPage, ViewerError> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .ok_or(ViewerError::PageOutOfRange(page_number))
    }
}

impl DocumentViewer for SnapshotDocument {
    fn destination<'a>(&'a self, anchor: &'a str) -> ViewerFuture<'a, Option<RawDestination>> {
        Box::pin(async move { Ok(self.destinations.get(anchor).cloned()) })
    }

    fn num_pages(&self) -> usize {
        self.pages.len()
    }

    fn page_ref(&self, page_number: usize) -> ViewerFuture<'_, PageRef> {
        Box::pin(async move { Ok(self.page(page_number)?.page_ref) })
    }

    fn text_content(&self, page_number: usize) -> ViewerFuture<'_, Vec<PositionedFragment>> {
        Box::pin(async move { Ok(self.page(page_number)?.fragments.clone()) })
    }

    fn annotations(&self, page_number: usize) -> ViewerFuture<'_, Vec<LinkAnnotation>> {
        Box::pin(async move { Ok(self.page(page_number)?.annotations.clone()) })
    }
}
