//! End-to-end segmentation of one page
//!
//! load → erode/binarize → trace → classify → merge → composite.
//! Every call allocates its own buffers and returns fresh rasters; calls
//! share no state.

use opencv::core::Mat;

use crate::compositing::{Compositor, CroppedOutput};
use crate::config::SegmentConfig;
use crate::detection::{merge_nested, ContourExtractor, ObjectClassifier, Preprocessor};
use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::image_loader::{load_raster, ChannelLayout, RasterInput};

/// Crops and painted page of one segmentation call
#[derive(Debug)]
pub struct SegmentationResult {
    /// One crop per tracing, in contour order
    pub crops: Vec<CroppedOutput>,
    /// Source page with every tracing footprint painted with the fill
    pub page: Mat,
}

impl SegmentationResult {
    /// Cropped rasters, in the same order as [`boxes`](Self::boxes)
    pub fn images(&self) -> Vec<&Mat> {
        self.crops.iter().map(|crop| &crop.image).collect()
    }

    /// Pre-padding boxes of the crops
    pub fn boxes(&self) -> Vec<BoundingBox> {
        self.crops.iter().map(|crop| crop.bbox).collect()
    }

    /// True when no tracing passed classification
    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }
}

/// Intermediate rasters and counts, for inspecting a run
#[derive(Debug)]
pub struct SegmentationDebug {
    /// Grayscale analysis raster
    pub gray: Mat,
    /// Grayscale raster after erosion
    pub eroded: Mat,
    /// Otsu mask
    pub binary: Mat,
    /// Threshold chosen by Otsu's method
    pub threshold: f64,
    /// Layout of the source raster
    pub layout: ChannelLayout,
    /// Contours traced on the mask
    pub contour_count: usize,
    /// Records accepted by classification, before merging
    pub classified_count: usize,
}

/// Reusable segmentation pipeline with a validated configuration
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmentConfig,
}

impl Segmenter {
    /// Validate `config` and build a segmenter
    pub fn new(config: SegmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Segment one page
    pub fn segment(&self, input: RasterInput) -> Result<SegmentationResult> {
        self.run(input).map(|(result, _)| result)
    }

    /// Segment one page and keep the intermediate rasters
    pub fn segment_debug(&self, input: RasterInput) -> Result<(SegmentationResult, SegmentationDebug)> {
        self.run(input)
    }

    fn run(&self, input: RasterInput) -> Result<(SegmentationResult, SegmentationDebug)> {
        let raster = load_raster(input)?;

        let preprocessed = Preprocessor::with_kernel_size(self.config.erosion_kernel_size).run(&raster.gray)?;
        let contours = ContourExtractor::new().extract(&preprocessed.binary)?;

        let classifier = ObjectClassifier::with_params(self.config.size_threshold, self.config.max_aspect_ratio);
        let classified = classifier.classify(&contours, raster.layout);
        let classified_count = classified.len();
        let records = merge_nested(classified);

        if records.is_empty() {
            log::debug!("Page has no tracings; returning it unpainted");
        }

        let composite = Compositor::from_config(&self.config).composite(&raster.original, raster.layout, &records)?;

        log::debug!(
            "Segmented {:?} page: {} contours, {} classified, {} kept",
            raster.layout,
            contours.len(),
            classified_count,
            composite.crops.len()
        );

        let debug = SegmentationDebug {
            gray: raster.gray,
            eroded: preprocessed.eroded,
            binary: preprocessed.binary,
            threshold: preprocessed.threshold,
            layout: raster.layout,
            contour_count: contours.len(),
            classified_count,
        };

        Ok((
            SegmentationResult {
                crops: composite.crops,
                page: composite.page,
            },
            debug,
        ))
    }
}
