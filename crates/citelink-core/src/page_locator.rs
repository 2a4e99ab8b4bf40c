use crate::ResolveError;
use crate::destination::PageRef;
use crate::viewer::DocumentViewer;

/// The page a destination points into, plus its successor (if any) for
/// entries that continue across the page break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedPages {
    pub primary: usize,
    pub next: Option<usize>,
}

/// Scan pages `1..=num_pages` in order for the first page whose reference
/// number matches `target`.
pub async fn locate_pages(
    viewer: &dyn DocumentViewer,
    target: PageRef,
) -> Result<LocatedPages, ResolveError> {
    let num_pages = viewer.num_pages();
    for page_number in 1..=num_pages {
        let page_ref = viewer.page_ref(page_number).await?;
        if page_ref.num == target.num {
            let next = (page_number < num_pages).then_some(page_number + 1);
            tracing::debug!(page = page_number, ref_num = target.num, "located destination page");
            return Ok(LocatedPages {
                primary: page_number,
                next,
            });
        }
    }
    Err(ResolveError::PageNotFound(target.num))
}
