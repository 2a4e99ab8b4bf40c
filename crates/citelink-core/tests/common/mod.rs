//! Shared fixtures: an in-memory viewer with a small bibliography.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use citelink_core::search::mock::{MockResponse, MockSearch};
use citelink_core::viewer::ViewerFuture;
use citelink_core::{
    CitationResolver, Config, DocumentViewer, LinkAnnotation, PageRef, PositionedFragment,
    RawDestination, ViewerError,
};
use serde_json::json;

pub struct FakePage {
    pub page_ref: PageRef,
    pub fragments: Vec<PositionedFragment>,
    pub annotations: Vec<LinkAnnotation>,
}

#[derive(Default)]
pub struct InMemoryViewer {
    pub destinations: HashMap<String, RawDestination>,
    pub pages: Vec<FakePage>,
}

impl InMemoryViewer {
    fn page(&self, page_number: usize) -> Result<&FakePage, ViewerError> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .ok_or(ViewerError::PageOutOfRange(page_number))
    }

    pub fn with_destination(mut self, anchor: &str, dest: serde_json::Value) -> Self {
        self.destinations
            .insert(anchor.to_string(), serde_json::from_value(dest).unwrap());
        self
    }
}

impl DocumentViewer for InMemoryViewer {
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

pub fn frag(text: &str, x: f64, y: f64, width: f64) -> PositionedFragment {
    PositionedFragment::at(text, x, y, width, 9.0)
}

pub const ENTRY_12_LINK: &str = "https://arxiv.org/abs/1905.00001";
pub const ENTRY_12_TEXT: &str = "Author et al. Visualizing results. arXiv:1905.00001,";

/// Three pages: body text (ref 10), a numbered bibliography (ref 41) whose
/// last entry continues onto the final page (ref 55).
pub fn bibliography(with_entry_link: bool) -> InMemoryViewer {
    let intro = FakePage {
        page_ref: PageRef::new(10),
        fragments: vec![frag("Introduction", 72.0, 720.0, 80.0)],
        annotations: vec![],
    };

    let mut annotations = vec![
        // Internal link back to the body text.
        LinkAnnotation::new([60.0, 695.0, 90.0, 712.0], None),
    ];
    if with_entry_link {
        annotations.push(LinkAnnotation::new(
            [90.0, 686.0, 300.0, 699.0],
            Some(ENTRY_12_LINK.to_string()),
        ));
    }

    let references = FakePage {
        page_ref: PageRef::new(41),
        fragments: vec![
            frag("References", 72.0, 740.0, 70.0),
            frag("[11]", 72.0, 718.0, 14.0),
            frag("Smith, A. Older work. 2001.", 92.0, 718.0, 150.0),
            frag("[12]", 72.0, 700.0, 14.0),
            frag("Author et al. Visual-", 92.0, 700.0, 110.0),
            frag("izing results. arXiv:1905.00001,", 92.0, 689.0, 200.0),
            frag("2019.", 92.0, 678.0, 25.0),
            frag("[13]", 72.0, 660.0, 14.0),
            frag("Jones, B. Numbers only matter", 92.0, 660.0, 160.0),
            frag("sometimes.", 92.0, 649.0, 55.0),
            frag("[14]", 72.0, 80.0, 14.0),
            frag("Lee, C. A long entry that", 92.0, 80.0, 140.0),
            frag("continues", 92.0, 69.0, 50.0),
        ],
        annotations,
    };

    let continuation = FakePage {
        page_ref: PageRef::new(55),
        fragments: vec![
            frag("on the next page. 2021.", 92.0, 760.0, 120.0),
            frag("[15]", 72.0, 742.0, 14.0),
            frag("Zhou, D. Final. 2022.", 92.0, 742.0, 110.0),
        ],
        annotations: vec![LinkAnnotation::new(
            [90.0, 755.0, 220.0, 770.0],
            Some("https://example.org/next-page-link".to_string()),
        )],
    };

    InMemoryViewer {
        destinations: HashMap::new(),
        pages: vec![intro, references, continuation],
    }
    .with_destination("cite.author2019", json!([{"num": 41, "gen": 0}, {"name": "XYZ"}, 72, 700, null]))
    .with_destination("cite.jones", json!([{"num": 41, "gen": 0}, {"name": "FitH"}, 662]))
    .with_destination("cite.lee", json!([{"num": 41, "gen": 0}, {"name": "XYZ"}, 72, 82, 0]))
    .with_destination("cite.müller", json!([{"num": 41, "gen": 0}, {"name": "XYZ"}, 72, 718, null]))
    .with_destination("cite.fitr", json!([{"num": 41, "gen": 0}, {"name": "FitR"}, 0, 0, 100, 100]))
    .with_destination("cite.gone", json!([{"num": 99, "gen": 0}, {"name": "XYZ"}, 72, 700, null]))
    .with_destination("cite.margin", json!([{"num": 41, "gen": 0}, {"name": "XYZ"}, 500, 700, null]))
}

pub fn resolver(viewer: InMemoryViewer, search: Arc<MockSearch>) -> CitationResolver {
    CitationResolver::new(Arc::new(viewer), search, Config::default())
}

pub fn search_returning(links: &[&str]) -> Arc<MockSearch> {
    Arc::new(MockSearch::new(MockResponse::Links(
        links.iter().map(|l| l.to_string()).collect(),
    )))
}
