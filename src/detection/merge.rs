//! Nested-box deduplication
//!
//! An outline that is not fully closed can leave an inner ring that passes
//! classification next to the outer one. Any record whose box lies inside
//! another retained box is dropped. Pages carry few tracings, so a pairwise
//! box test is enough; polygon containment is not needed.

use crate::detection::classify::ObjectRecord;

/// Remove records whose box is contained in another record's box.
///
/// Identical boxes keep the first-seen record. Surviving records keep their
/// input order.
pub fn merge_nested(records: Vec<ObjectRecord>) -> Vec<ObjectRecord> {
    let boxes: Vec<_> = records.iter().map(ObjectRecord::bbox).collect();

    let is_nested = |j: usize| {
        boxes.iter().enumerate().any(|(i, outer)| {
            i != j && outer.contains(&boxes[j]) && (*outer != boxes[j] || i < j)
        })
    };

    let before = records.len();
    let merged: Vec<ObjectRecord> = records
        .into_iter()
        .enumerate()
        .filter(|(j, _)| !is_nested(*j))
        .map(|(_, record)| record)
        .collect();

    if merged.len() < before {
        log::debug!("Merged {} nested boxes", before - merged.len());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn record(x: i32, y: i32, w: i32, h: i32) -> ObjectRecord {
        ObjectRecord::new(Vec::new(), BoundingBox::new(x, y, w, h))
    }

    fn boxes(records: &[ObjectRecord]) -> Vec<BoundingBox> {
        records.iter().map(ObjectRecord::bbox).collect()
    }

    #[test]
    fn test_inner_ring_removed() {
        let merged = merge_nested(vec![record(100, 100, 600, 500), record(200, 200, 250, 200)]);
        assert_eq!(boxes(&merged), vec![BoundingBox::new(100, 100, 600, 500)]);
    }

    #[test]
    fn test_inner_first_still_removed() {
        let merged = merge_nested(vec![record(200, 200, 250, 200), record(100, 100, 600, 500)]);
        assert_eq!(boxes(&merged), vec![BoundingBox::new(100, 100, 600, 500)]);
    }

    #[test]
    fn test_disjoint_and_overlapping_kept_in_order() {
        let input = vec![
            record(0, 0, 300, 300),
            record(500, 0, 300, 300),
            // overlaps the first but sticks out
            record(200, 200, 300, 300),
        ];
        let merged = merge_nested(input.clone());
        assert_eq!(merged, input);
    }

    #[test]
    fn test_identical_boxes_keep_first() {
        let first = ObjectRecord::new(vec![opencv::core::Point::new(1, 1)], BoundingBox::new(10, 10, 300, 200));
        let second = record(10, 10, 300, 200);
        let merged = merge_nested(vec![first.clone(), second]);
        assert_eq!(merged, vec![first]);
    }

    #[test]
    fn test_shared_edge_counts_as_contained() {
        let merged = merge_nested(vec![record(0, 0, 400, 400), record(0, 0, 400, 100)]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_no_survivor_contains_another() {
        let merged = merge_nested(vec![
            record(0, 0, 1000, 1000),
            record(10, 10, 400, 400),
            record(20, 20, 100, 100),
            record(1200, 0, 300, 300),
            record(1250, 50, 50, 50),
        ]);
        let kept = boxes(&merged);
        assert_eq!(kept.len(), 2);
        for (i, a) in kept.iter().enumerate() {
            for (j, b) in kept.iter().enumerate() {
                if i != j {
                    assert!(!a.contains(b));
                }
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_nested(Vec::new()).is_empty());
    }
}
