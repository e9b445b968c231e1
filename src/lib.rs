//! # Rubbing Scan
//!
//! A Rust crate for extracting hand-drawn rubbing tracings from scanned pages.
//!
//! Each page is processed by:
//! - Eroding and Otsu-binarizing the grayscale page
//! - Tracing the full contour hierarchy of the mask
//! - Keeping contours whose depth, size and aspect look like a tracing rather
//!   than a printed label or title
//! - Dropping boxes nested inside another kept box
//! - Cropping each tracing with padding and painting it out of the page
//!
//! ## Example
//!
//! ```rust,no_run
//! use rubbing_scan::{segment, BorderFill, CropMode, RasterInput, SegmentConfig};
//! use std::path::Path;
//!
//! let config = SegmentConfig::new((200, 150), CropMode::Rectangle, BorderFill::White);
//! let result = segment(RasterInput::from(Path::new("page.png")), &config)?;
//! for bbox in result.boxes() {
//!     println!("tracing at {}", bbox);
//! }
//! # Ok::<(), rubbing_scan::SegmentError>(())
//! ```

pub mod batch;
pub mod compositing;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod image_loader;
pub mod labeling;
pub mod output;
pub mod pipeline;

pub use compositing::CroppedOutput;
pub use config::{BatchConfig, BorderFill, CropMode, SegmentConfig, SizeThreshold};
pub use detection::ObjectRecord;
pub use error::{Result, SegmentError};
pub use geometry::BoundingBox;
pub use image_loader::{ChannelLayout, RasterInput};
pub use output::OutputWriter;
pub use pipeline::{SegmentationDebug, SegmentationResult, Segmenter};

/// Segment one page into tracing crops and a painted page
///
/// This is the main entry point. The call is a pure function of its input and
/// configuration: nothing is cached between calls.
///
/// # Arguments
///
/// * `input` - Image path, decoded image, or raw 8-bit raster
/// * `config` - Segmentation parameters
///
/// # Returns
///
/// A `SegmentationResult` whose crops carry their pre-padding boxes. A page
/// without tracings gives an empty result and an unpainted page.
///
/// # Errors
///
/// Returns `SegmentError` if:
/// - The configuration is invalid
/// - The path does not exist or the image cannot be decoded
/// - The raster shape is not supported
/// - An OpenCV operation fails
pub fn segment(input: RasterInput, config: &SegmentConfig) -> Result<SegmentationResult> {
    Segmenter::new(config.clone())?.segment(input)
}

/// Segment one page and return the intermediate rasters as well
pub fn segment_debug(input: RasterInput, config: &SegmentConfig) -> Result<(SegmentationResult, SegmentationDebug)> {
    Segmenter::new(config.clone())?.segment_debug(input)
}
