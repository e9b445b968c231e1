//! Tracing vs. label classification
//!
//! A contour is kept as a tracing when three tests pass:
//!
//! 1. its depth in the contour tree matches the active [`DepthSelector`],
//! 2. its box is wider than the minimum width OR taller than the minimum height,
//! 3. its width/height ratio stays strictly below the aspect cap.
//!
//! On a white page, tracings are holes of the paper region and sit one level
//! below the page border. Label numerals sit at the same level but are far
//! smaller after erosion, glyph interiors nest deeper, and horizontal title
//! bands fail the aspect cap.

use crate::config::SizeThreshold;
use crate::constants::classification::MAX_ASPECT_RATIO;
use crate::detection::contours::{ContourSet, TracedContour};
use crate::geometry::BoundingBox;
use crate::image_loader::ChannelLayout;

use opencv::core::Point;

/// Depth rule applied before the geometric tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthSelector {
    /// Parent is a top-level contour (parent depth 1)
    ChildOfTopLevel,
    /// Directly under the image border (parent depth 0)
    TopLevel,
}

impl DepthSelector {
    /// Parent depth this selector accepts
    pub fn parent_depth(&self) -> usize {
        match self {
            DepthSelector::ChildOfTopLevel => 1,
            DepthSelector::TopLevel => 0,
        }
    }

    pub fn matches(&self, parent_depth: usize) -> bool {
        self.parent_depth() == parent_depth
    }

    /// Selectors tried in order until one yields a result.
    ///
    /// Color scans fall back to top-level contours; grayscale scans have no
    /// fallback.
    pub fn strategy_for(layout: ChannelLayout) -> &'static [DepthSelector] {
        if layout.is_color() {
            &[DepthSelector::ChildOfTopLevel, DepthSelector::TopLevel]
        } else {
            &[DepthSelector::ChildOfTopLevel]
        }
    }
}

/// A contour accepted as a tracing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    contour: Vec<Point>,
    bbox: BoundingBox,
}

impl ObjectRecord {
    pub fn new(contour: Vec<Point>, bbox: BoundingBox) -> Self {
        Self { contour, bbox }
    }

    pub fn contour(&self) -> &[Point] {
        &self.contour
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }
}

impl From<&TracedContour> for ObjectRecord {
    fn from(traced: &TracedContour) -> Self {
        Self::new(traced.points.clone(), traced.bbox)
    }
}

/// Classifier separating tracings from label text
pub struct ObjectClassifier {
    size_threshold: SizeThreshold,
    max_aspect_ratio: f64,
}

impl Default for ObjectClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectClassifier {
    /// Create a classifier with the default thresholds
    pub fn new() -> Self {
        Self {
            size_threshold: SizeThreshold::default(),
            max_aspect_ratio: MAX_ASPECT_RATIO,
        }
    }

    /// Create a classifier with custom thresholds
    pub fn with_params(size_threshold: SizeThreshold, max_aspect_ratio: f64) -> Self {
        Self {
            size_threshold,
            max_aspect_ratio,
        }
    }

    /// Size and aspect tests on a bounding box
    pub fn passes_geometry(&self, bbox: &BoundingBox) -> bool {
        let large_enough = bbox.width > self.size_threshold.min_width
            || bbox.height > self.size_threshold.min_height;
        large_enough && bbox.aspect_ratio() < self.max_aspect_ratio
    }

    /// Records accepted by a single selector, in contour order
    pub fn select(&self, contours: &ContourSet, selector: DepthSelector) -> Vec<ObjectRecord> {
        contours
            .iter()
            .enumerate()
            .filter(|(index, traced)| {
                selector.matches(contours.parent_depth(*index)) && self.passes_geometry(&traced.bbox)
            })
            .map(|(_, traced)| ObjectRecord::from(traced))
            .collect()
    }

    /// Run the layout's selector strategy until one yields records.
    ///
    /// An empty result is legitimate: the page holds no tracing.
    pub fn classify(&self, contours: &ContourSet, layout: ChannelLayout) -> Vec<ObjectRecord> {
        for selector in DepthSelector::strategy_for(layout) {
            let records = self.select(contours, *selector);
            if !records.is_empty() {
                log::debug!("{:?} selected {} tracings", selector, records.len());
                return records;
            }
        }
        log::debug!("No tracing passed classification ({} contours)", contours.len());
        Vec::new()
    }
}
