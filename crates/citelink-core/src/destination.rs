//! Decoding of viewer destinations into a page reference and target point.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ResolveError;
use crate::layout::TargetPoint;

/// A page's internal object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub num: u32,
    #[serde(default, rename = "gen")]
    pub generation: u32,
}

impl PageRef {
    pub fn new(num: u32) -> Self {
        Self { num, generation: 0 }
    }
}

/// An explicit destination exactly as the viewer hands it out:
/// `[pageRef, {"name": mode}, args...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDestination(pub Vec<Value>);

impl fmt::Display for RawDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Array(self.0.clone()))
    }
}

/// Supported positioning modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Explicit left/top coordinates.
    Xyz,
    /// Fit page width; only the top coordinate is given.
    FitH,
}

/// A decoded destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub page_ref: PageRef,
    pub mode: LinkMode,
    pub target: TargetPoint,
}

/// Decode `raw` into a page reference and target point.
///
/// A `null` x decodes as the left edge and a `null` y as the very top of the
/// page (`+inf`).
pub fn interpret(raw: &RawDestination) -> Result<Destination, ResolveError> {
    let page_ref = raw
        .0
        .first()
        .and_then(|v| serde_json::from_value::<PageRef>(v.clone()).ok())
        .ok_or_else(|| ResolveError::InvalidDestination(raw.to_string()))?;

    let name = raw
        .0
        .get(1)
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| ResolveError::InvalidDestination(raw.to_string()))?;

    let coord = |idx: usize| raw.0.get(idx).and_then(Value::as_f64);

    let (mode, target) = match name {
        "XYZ" => (
            LinkMode::Xyz,
            TargetPoint::new(coord(2).unwrap_or(0.0), coord(3).unwrap_or(f64::INFINITY)),
        ),
        "FitH" => (
            LinkMode::FitH,
            TargetPoint::new(0.0, coord(2).unwrap_or(f64::INFINITY)),
        ),
        other => return Err(ResolveError::UnrecognizedLinkMode(other.to_string())),
    };

    Ok(Destination {
        page_ref,
        mode,
        target,
    })
}
