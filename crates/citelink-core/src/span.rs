//! Locating one bibliography entry in a page's positioned text.
//!
//! An entry starts at the first fragment near the target point that also
//! starts a visual line, and ends right before the next fragment that starts
//! a new entry: a new line following a sentence-final period, or a bracketed
//! numeric marker such as `[12]`.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ResolveError;
use crate::layout::{PositionedFragment, TargetPoint};

static NUMERIC_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Tunable layout thresholds for entry detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanHeuristics {
    /// A vertical jump of at least `line_gap_factor * height` starts a new line.
    pub line_gap_factor: f64,
    /// How far below the target y the entry's first line may sit.
    pub vertical_tolerance: f64,
}

impl Default for SpanHeuristics {
    fn default() -> Self {
        Self {
            line_gap_factor: 1.25,
            vertical_tolerance: 15.0,
        }
    }
}

impl SpanHeuristics {
    fn is_line_break(&self, prev: &PositionedFragment, frag: &PositionedFragment) -> bool {
        (frag.y() - prev.y()).abs() >= frag.height * self.line_gap_factor
    }
}

/// Whether the text carries a numbered-reference marker like `[3]`.
pub fn has_numeric_marker(text: &str) -> bool {
    NUMERIC_MARKER.is_match(text)
}

/// Find the index range of the entry referenced by `target` in `fragments`.
///
/// `fragments` is the primary page's text followed by the next page's. When
/// no end boundary is found the range runs to the end of `fragments`.
pub fn find_entry_span(
    fragments: &[PositionedFragment],
    target: TargetPoint,
    heuristics: &SpanHeuristics,
) -> Result<Range<usize>, ResolveError> {
    let first = fragments
        .iter()
        .enumerate()
        .position(|(idx, frag)| {
            let starts_line = idx == 0
                || heuristics.is_line_break(&fragments[idx - 1], frag)
                || has_numeric_marker(&frag.text);
            frag.center_x() >= target.x
                && frag.y() <= target.y
                && frag.y() >= target.y - heuristics.vertical_tolerance
                && starts_line
        })
        .ok_or_else(|| {
            ResolveError::EntryNotFound(format!("({}, {})", target.x, target.y))
        })?;

    let last = (first + 1..fragments.len())
        .find(|&idx| {
            let prev = &fragments[idx - 1];
            let frag = &fragments[idx];
            (prev.text.ends_with('.') && heuristics.is_line_break(prev, frag))
                || has_numeric_marker(&frag.text)
        })
        .unwrap_or(fragments.len());

    tracing::trace!(first, last, total = fragments.len(), "entry span");
    Ok(first..last)
}
