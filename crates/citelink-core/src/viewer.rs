use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::destination::{PageRef, RawDestination};
use crate::layout::{LinkAnnotation, PositionedFragment};

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("page {0} is out of range")]
    PageOutOfRange(usize),
    #[error("failed to load page {page}: {message}")]
    PageLoad { page: usize, message: String },
}

/// Boxed future returned by [`DocumentViewer`] methods.
pub type ViewerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ViewerError>> + Send + 'a>>;

/// The hosting document viewer's model of an open document.
///
/// Page numbers are 1-based, matching the viewer's own numbering. Every
/// method is a suspension point; implementors may load pages lazily.
pub trait DocumentViewer: Send + Sync {
    /// Look up a named destination. `None` means the anchor is unknown.
    fn destination<'a>(&'a self, anchor: &'a str) -> ViewerFuture<'a, Option<RawDestination>>;

    fn num_pages(&self) -> usize;

    /// Load the page's internal object reference.
    fn page_ref(&self, page_number: usize) -> ViewerFuture<'_, PageRef>;

    /// Positioned text items of a page, in reading order.
    fn text_content(&self, page_number: usize) -> ViewerFuture<'_, Vec<PositionedFragment>>;

    /// Link annotations of a page.
    fn annotations(&self, page_number: usize) -> ViewerFuture<'_, Vec<LinkAnnotation>>;
}
