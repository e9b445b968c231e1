//! Erosion and global binarization
//!
//! Rubbing strokes are thin and often broken. A large square erosion grows
//! every dark stroke until neighbouring fragments fuse into solid blobs, then
//! Otsu's method picks a single global threshold. Scans in this corpus are
//! high-contrast, so a global threshold is enough; a noisier source would need
//! an edge-based segmentation instead.

use opencv::{
    core::{Mat, Point, Scalar, BORDER_CONSTANT, CV_8U},
    imgproc::{erode, morphology_default_border_value, threshold, THRESH_BINARY, THRESH_OTSU},
    prelude::*,
};

use crate::constants::morphology::{BINARY_MAX_VALUE, EROSION_KERNEL_SIZE};
use crate::error::{Result, SegmentError};

/// Binary mask with its intermediate raster
#[derive(Debug)]
pub struct PreprocessResult {
    /// Grayscale raster after erosion
    pub eroded: Mat,
    /// Mask in {0, 255}; 255 is bright paper
    pub binary: Mat,
    /// Threshold chosen by Otsu's method
    pub threshold: f64,
}

/// Preprocessor turning a grayscale page into a topology-only mask
pub struct Preprocessor {
    kernel_size: i32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    /// Create a preprocessor with the default kernel
    pub fn new() -> Self {
        Self {
            kernel_size: EROSION_KERNEL_SIZE,
        }
    }

    /// Create a preprocessor with a custom square kernel side
    pub fn with_kernel_size(kernel_size: i32) -> Self {
        Self { kernel_size }
    }

    /// Erode then binarize a single-channel page
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an even or non-positive kernel and
    /// `OpenCvError` if a morphology call fails.
    pub fn run(&self, gray: &Mat) -> Result<PreprocessResult> {
        let eroded = self.erode(gray)?;
        let (binary, threshold) = self.binarize(&eroded)?;

        log::debug!(
            "Preprocessed {}x{} page (kernel {}, Otsu threshold {:.1})",
            gray.cols(),
            gray.rows(),
            self.kernel_size,
            threshold
        );

        Ok(PreprocessResult {
            eroded,
            binary,
            threshold,
        })
    }

    /// Grow dark strokes with a dense square structuring element
    fn erode(&self, gray: &Mat) -> Result<Mat> {
        if self.kernel_size < 1 || self.kernel_size % 2 == 0 {
            return Err(SegmentError::invalid_parameter(
                "erosion_kernel_size",
                self.kernel_size,
            ));
        }

        let kernel = Mat::new_rows_cols_with_default(
            self.kernel_size,
            self.kernel_size,
            CV_8U,
            Scalar::all(1.0),
        )
        .map_err(|e| SegmentError::opencv("erosion kernel creation", e))?;

        let border_value = morphology_default_border_value()
            .map_err(|e| SegmentError::opencv("morphology border value", e))?;

        let mut eroded = Mat::default();
        erode(
            gray,
            &mut eroded,
            &kernel,
            Point::new(-1, -1),
            1,
            BORDER_CONSTANT,
            border_value,
        )
        .map_err(|e| SegmentError::opencv("erosion", e))?;

        Ok(eroded)
    }

    /// Otsu binarization of the eroded page
    fn binarize(&self, eroded: &Mat) -> Result<(Mat, f64)> {
        let mut binary = Mat::default();
        let level = threshold(
            eroded,
            &mut binary,
            0.0,
            BINARY_MAX_VALUE,
            THRESH_BINARY | THRESH_OTSU,
        )
        .map_err(|e| SegmentError::opencv("Otsu threshold", e))?;

        Ok((binary, level))
    }
}
