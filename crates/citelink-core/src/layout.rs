//! Page-space geometry for text fragments and link annotations.
//!
//! Coordinates follow the viewer's page space: the origin is the bottom-left
//! corner of the page and y grows upward.

use serde::{Deserialize, Serialize};

/// A point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub x: f64,
    pub y: f64,
}

impl TargetPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One positioned run of text, as produced by the viewer's text-content
/// extraction for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    #[serde(rename = "str")]
    pub text: String,
    /// Text-space to page-space matrix `[a, b, c, d, e, f]`; `e`/`f` are the
    /// fragment's origin.
    pub transform: [f64; 6],
    pub width: f64,
    pub height: f64,
}

impl PositionedFragment {
    /// Build an unscaled fragment whose origin sits at `(x, y)`.
    pub fn at(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            transform: [1.0, 0.0, 0.0, 1.0, x, y],
            width,
            height,
        }
    }

    pub fn x(&self) -> f64 {
        self.transform[4]
    }

    pub fn y(&self) -> f64 {
        self.transform[5]
    }

    /// Horizontal midpoint of the fragment's bounding box.
    pub fn center_x(&self) -> f64 {
        self.x() + self.width / 2.0
    }

    pub fn center(&self) -> TargetPoint {
        TargetPoint::new(self.center_x(), self.y() + self.height / 2.0)
    }
}

/// A link annotation on a page.
///
/// `url` is `None` for non-URI actions such as internal navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    /// `[x_min, y_min, x_max, y_max]` in page space.
    pub rect: [f64; 4],
    #[serde(default)]
    pub url: Option<String>,
}

impl LinkAnnotation {
    pub fn new(rect: [f64; 4], url: Option<String>) -> Self {
        Self { rect, url }
    }

    /// Inclusive containment test against the annotation rectangle.
    pub fn contains(&self, point: TargetPoint) -> bool {
        let [x_min, y_min, x_max, y_max] = self.rect;
        point.x >= x_min && point.x <= x_max && point.y >= y_min && point.y <= y_max
    }
}
