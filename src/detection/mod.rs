//! Tracing detection
//!
//! Binarizes a page, traces its contour tree, keeps the contours that look
//! like tracings, and collapses nested duplicates.

pub mod classify;
pub mod contours;
pub mod merge;
pub mod preprocess;

pub use classify::{DepthSelector, ObjectClassifier, ObjectRecord};
pub use contours::{ContourExtractor, ContourSet, TracedContour};
pub use merge::merge_nested;
pub use preprocess::{PreprocessResult, Preprocessor};
