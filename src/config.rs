//! Configuration structures for the rubbing segmentation pipeline.
//!
//! A single [`SegmentConfig`] value holds every tunable parameter of one
//! segmentation call. It is validated once before the pipeline runs, so the
//! individual stages never see an impossible combination.
//!
//! # Configuration Loading
//!
//! ```no_run
//! use rubbing_scan::{BatchConfig, SegmentConfig};
//! use std::path::Path;
//!
//! // Load from file
//! let config = BatchConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let segment = SegmentConfig::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{classification, compositing, morphology};
use crate::error::{Result, SegmentError};

/// Shape used to isolate a tracing before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropMode {
    /// Bounding rectangle of the contour. Robust against broken outlines.
    #[serde(rename = "rect")]
    Rectangle,
    /// Filled contour polygon. Precise, but open or self-intersecting
    /// outlines leave holes in the crop.
    #[serde(rename = "poly")]
    Polygon,
}

/// Fill used for the crop padding and for the painted page footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderFill {
    White,
    Black,
    Transparent,
}

impl BorderFill {
    /// Fill color as BGRA samples
    pub fn bgra(&self) -> [f64; 4] {
        match self {
            BorderFill::White => [255.0, 255.0, 255.0, 255.0],
            BorderFill::Black => [0.0, 0.0, 0.0, 255.0],
            BorderFill::Transparent => [255.0, 255.0, 255.0, 0.0],
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, BorderFill::Transparent)
    }
}

/// Width/height limits separating tracings from label text.
///
/// A contour is large enough when its box is wider than `min_width` OR
/// taller than `min_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeThreshold {
    pub min_width: i32,
    pub min_height: i32,
}

impl SizeThreshold {
    pub fn new(min_width: i32, min_height: i32) -> Self {
        Self {
            min_width,
            min_height,
        }
    }
}

impl Default for SizeThreshold {
    fn default() -> Self {
        Self::new(
            classification::MIN_OBJECT_WIDTH,
            classification::MIN_OBJECT_HEIGHT,
        )
    }
}

impl From<(i32, i32)> for SizeThreshold {
    fn from((min_width, min_height): (i32, i32)) -> Self {
        Self::new(min_width, min_height)
    }
}

/// Parameters of one segmentation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Size threshold between tracings and labels
    pub size_threshold: SizeThreshold,

    /// Isolation shape for cropping
    pub crop_mode: CropMode,

    /// Padding and page fill
    pub border_fill: BorderFill,

    /// Square erosion kernel side (odd)
    pub erosion_kernel_size: i32,

    /// Exclusive upper bound on box width/height
    pub max_aspect_ratio: f64,

    /// Padding per side as a fraction of the box dimension
    pub padding_ratio: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            size_threshold: SizeThreshold::default(),
            crop_mode: CropMode::Rectangle,
            border_fill: BorderFill::White,
            erosion_kernel_size: morphology::EROSION_KERNEL_SIZE,
            max_aspect_ratio: classification::MAX_ASPECT_RATIO,
            padding_ratio: compositing::PADDING_RATIO,
        }
    }
}

impl SegmentConfig {
    /// Default configuration with a custom size threshold, crop mode and fill
    pub fn new(size_threshold: impl Into<SizeThreshold>, crop_mode: CropMode, border_fill: BorderFill) -> Self {
        Self {
            size_threshold: size_threshold.into(),
            crop_mode,
            border_fill,
            ..Self::default()
        }
    }

    /// Check every parameter, returning the first offending one
    pub fn validate(&self) -> Result<()> {
        if self.erosion_kernel_size < 1 || self.erosion_kernel_size % 2 == 0 {
            return Err(SegmentError::invalid_parameter(
                "erosion_kernel_size",
                self.erosion_kernel_size,
            ));
        }
        if self.size_threshold.min_width < 0 {
            return Err(SegmentError::invalid_parameter(
                "size_threshold.min_width",
                self.size_threshold.min_width,
            ));
        }
        if self.size_threshold.min_height < 0 {
            return Err(SegmentError::invalid_parameter(
                "size_threshold.min_height",
                self.size_threshold.min_height,
            ));
        }
        if !(self.max_aspect_ratio.is_finite() && self.max_aspect_ratio > 0.0) {
            return Err(SegmentError::invalid_parameter(
                "max_aspect_ratio",
                self.max_aspect_ratio,
            ));
        }
        if !(self.padding_ratio.is_finite() && self.padding_ratio >= 0.0) {
            return Err(SegmentError::invalid_parameter(
                "padding_ratio",
                self.padding_ratio,
            ));
        }
        Ok(())
    }
}

/// Batch run configuration: where to read pages, where to write results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Input image file or directory of images
    pub input_path: PathBuf,

    /// Output root; crops go to `images/`, pages to `pages/`
    pub output_path: PathBuf,

    /// Skip writing the painted pages
    #[serde(default = "default_only_objects")]
    pub only_objects: bool,

    /// Per-page segmentation parameters
    #[serde(default)]
    pub segmentation: SegmentConfig,
}

fn default_only_objects() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::with_paths("input", "output")
    }
}

impl BatchConfig {
    /// Configuration for the given paths with default parameters
    pub fn with_paths(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            only_objects: default_only_objects(),
            segmentation: SegmentConfig::default(),
        }
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.segmentation.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
