//! Bounding box geometry shared by classification, merging and persistence

use opencv::core::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle enclosing a contour, in page pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Width over height; infinite for a degenerate zero-height box
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return f64::INFINITY;
        }
        self.width as f64 / self.height as f64
    }

    /// Whether `other` lies entirely inside this box (edges may touch)
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Midpoint of the bottom edge, where the printed label usually sits
    pub fn bottom_midpoint(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.bottom() as f64,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Renders as `[x, y, w, h]`, the literal used in output file names
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x, self.y, self.width, self.height)
    }
}
