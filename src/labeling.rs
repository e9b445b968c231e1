//! Matching printed labels back to cropped tracings
//!
//! Printed numerals sit just below their tracing. Each tracing takes the text
//! whose center is closest to the midpoint of its box's bottom edge. Text boxes
//! come from a text layout extractor in document units, so they are scaled to
//! raster pixels first.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// One printed word with its box in document units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub text: String,
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl TextBox {
    pub fn new(text: impl Into<String>, x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Center in raster pixels for a given document-to-raster scale
    pub fn center(&self, scale: f64) -> (f64, f64) {
        (
            (self.x0 + self.x1) / 2.0 * scale,
            (self.top + self.bottom) / 2.0 * scale,
        )
    }
}

/// Document-to-raster scale: the mean of the horizontal and vertical ratios.
///
/// Returns 1.0 when the document size is degenerate.
pub fn page_scale(raster_size: (u32, u32), document_size: (f64, f64)) -> f64 {
    let (raster_w, raster_h) = raster_size;
    let (doc_w, doc_h) = document_size;
    if doc_w <= 0.0 || doc_h <= 0.0 {
        return 1.0;
    }
    (raster_w as f64 / doc_w + raster_h as f64 / doc_h) / 2.0
}

/// Text closest to the bottom midpoint of `bbox`; first wins on ties
pub fn nearest_label<'a>(bbox: &BoundingBox, texts: &'a [TextBox], scale: f64) -> Option<&'a str> {
    let (anchor_x, anchor_y) = bbox.bottom_midpoint();
    texts
        .iter()
        .map(|text| {
            let (cx, cy) = text.center(scale);
            (text, (cx - anchor_x).hypot(cy - anchor_y))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(text, _)| text.text.as_str())
}

/// Label for every box, in order
pub fn assign_labels(boxes: &[BoundingBox], texts: &[TextBox], scale: f64) -> Vec<Option<String>> {
    boxes
        .iter()
        .map(|bbox| nearest_label(bbox, texts, scale).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_scale_averages_ratios() {
        assert_eq!(page_scale((1200, 1800), (600.0, 900.0)), 2.0);
        assert_eq!(page_scale((1000, 1000), (500.0, 250.0)), 3.0);
        assert_eq!(page_scale((1000, 1000), (0.0, 250.0)), 1.0);
    }

    #[test]
    fn test_label_below_box_wins() {
        let bbox = BoundingBox::new(100, 100, 200, 100);
        let texts = vec![
            TextBox::new("17", 180.0, 210.0, 220.0, 230.0),
            TextBox::new("18", 400.0, 210.0, 440.0, 230.0),
            TextBox::new("title", 150.0, 10.0, 250.0, 30.0),
        ];
        assert_eq!(nearest_label(&bbox, &texts, 1.0), Some("17"));
    }

    #[test]
    fn test_scale_applies_to_text_boxes() {
        let bbox = BoundingBox::new(400, 400, 400, 200);
        // centers at (300, 310) and (600, 610) after doubling
        let texts = vec![
            TextBox::new("a", 140.0, 150.0, 160.0, 160.0),
            TextBox::new("b", 290.0, 300.0, 310.0, 310.0),
        ];
        assert_eq!(nearest_label(&bbox, &texts, 2.0), Some("b"));
        assert_eq!(nearest_label(&bbox, &texts, 1.0), Some("b"));
    }

    #[test]
    fn test_no_texts() {
        let bbox = BoundingBox::new(0, 0, 10, 10);
        assert_eq!(nearest_label(&bbox, &[], 1.0), None);
    }

    #[test]
    fn test_assign_labels_may_collide() {
        let boxes = vec![BoundingBox::new(0, 0, 100, 100), BoundingBox::new(150, 0, 100, 100)];
        let texts = vec![TextBox::new("5", 115.0, 100.0, 135.0, 110.0)];
        let labels = assign_labels(&boxes, &texts, 1.0);
        assert_eq!(labels, vec![Some("5".to_string()), Some("5".to_string())]);
    }
}
