//! Full-hierarchy contour tracing
//!
//! Classification depends on how deep a contour sits in the nesting tree, so
//! the tree retrieval mode is mandatory: a flat retrieval would lose the
//! parent links.

use opencv::{
    core::{Mat, Point, Vec4i, Vector},
    imgproc::{bounding_rect, find_contours_with_hierarchy, CHAIN_APPROX_SIMPLE, RETR_TREE},
    prelude::*,
};

use crate::error::{Result, SegmentError};
use crate::geometry::BoundingBox;

type VectorOfPoint = Vector<Point>;

/// Index of the parent entry in an OpenCV hierarchy record
const HIERARCHY_PARENT: usize = 3;

/// One traced boundary with its place in the nesting tree
#[derive(Debug, Clone, PartialEq)]
pub struct TracedContour {
    /// Boundary polyline (simple chain approximation)
    pub points: Vec<Point>,
    /// Index of the enclosing contour; `None` directly under the image border
    pub parent: Option<usize>,
    /// Bounding rectangle of `points`
    pub bbox: BoundingBox,
}

/// Every contour of a mask, indexable by the hierarchy's parent links
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    contours: Vec<TracedContour>,
}

impl ContourSet {
    pub fn new(contours: Vec<TracedContour>) -> Self {
        Self { contours }
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TracedContour> {
        self.contours.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TracedContour> {
        self.contours.iter()
    }

    /// Number of contours enclosing `index`.
    ///
    /// 0 means the contour hangs directly off the image border (the root),
    /// 1 means its parent is a top-level contour, and so on. Broken parent
    /// links stop the walk.
    pub fn parent_depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.contours.get(index).and_then(|c| c.parent);
        while let Some(parent) = current {
            if depth >= self.contours.len() {
                break;
            }
            depth += 1;
            current = self.contours.get(parent).and_then(|c| c.parent);
        }
        depth
    }
}

/// Contour extractor over binary masks
#[derive(Debug, Default, Clone, Copy)]
pub struct ContourExtractor;

impl ContourExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Trace every boundary of a single-channel mask, keeping the tree
    pub fn extract(&self, binary: &Mat) -> Result<ContourSet> {
        let mut contours = Vector::<VectorOfPoint>::new();
        let mut hierarchy = Vector::<Vec4i>::new();
        find_contours_with_hierarchy(
            binary,
            &mut contours,
            &mut hierarchy,
            RETR_TREE,
            CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| SegmentError::opencv("contour detection", e))?;

        let mut traced = Vec::with_capacity(contours.len());
        for (contour, link) in contours.iter().zip(hierarchy.iter()) {
            let rect = bounding_rect(&contour)
                .map_err(|e| SegmentError::opencv("bounding rectangle", e))?;
            let parent = usize::try_from(link[HIERARCHY_PARENT]).ok();
            traced.push(TracedContour {
                points: contour.to_vec(),
                parent,
                bbox: BoundingBox::from(rect),
            });
        }

        log::debug!("Traced {} contours", traced.len());
        Ok(ContourSet::new(traced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Scalar, CV_8UC1};
    use opencv::imgproc::{rectangle, FILLED, LINE_8};

    fn contour(parent: Option<usize>, bbox: BoundingBox) -> TracedContour {
        TracedContour {
            points: vec![Point::new(bbox.x, bbox.y)],
            parent,
            bbox,
        }
    }

    #[test]
    fn test_parent_depth_walks_links() {
        let b = BoundingBox::new(0, 0, 1, 1);
        let set = ContourSet::new(vec![
            contour(None, b),
            contour(Some(0), b),
            contour(Some(1), b),
            contour(None, b),
        ]);
        assert_eq!(set.parent_depth(0), 0);
        assert_eq!(set.parent_depth(1), 1);
        assert_eq!(set.parent_depth(2), 2);
        assert_eq!(set.parent_depth(3), 0);
    }

    #[test]
    fn test_parent_depth_survives_cycles() {
        let b = BoundingBox::new(0, 0, 1, 1);
        let set = ContourSet::new(vec![contour(Some(1), b), contour(Some(0), b)]);
        assert!(set.parent_depth(0) <= set.len());
    }

    #[test]
    fn test_extract_white_page_with_dark_ring() {
        // White paper, a dark square ring, white inside the ring
        let mut mask = Mat::new_rows_cols_with_default(200, 200, CV_8UC1, Scalar::all(255.0)).unwrap();
        rectangle(&mut mask, Rect::new(50, 50, 100, 100), Scalar::all(0.0), FILLED, LINE_8, 0).unwrap();
        rectangle(&mut mask, Rect::new(60, 60, 80, 80), Scalar::all(255.0), FILLED, LINE_8, 0).unwrap();

        let set = ContourExtractor::new().extract(&mask).unwrap();

        // paper outer border, ring hole, inner paper island
        assert_eq!(set.len(), 3);
        let depths: Vec<usize> = (0..set.len()).map(|i| set.parent_depth(i)).collect();
        assert!(depths.contains(&0));
        assert!(depths.contains(&1));
        assert!(depths.contains(&2));

        let hole = (0..set.len()).find(|&i| set.parent_depth(i) == 1).unwrap();
        let bbox = set.get(hole).unwrap().bbox;
        assert!(bbox.width >= 100 && bbox.width <= 102);
        assert!(bbox.height >= 100 && bbox.height <= 102);
    }

    #[test]
    fn test_extract_blank_mask() {
        let mask = Mat::new_rows_cols_with_default(30, 30, CV_8UC1, Scalar::all(0.0)).unwrap();
        let set = ContourExtractor::new().extract(&mask).unwrap();
        assert!(set.is_empty());
    }
}
