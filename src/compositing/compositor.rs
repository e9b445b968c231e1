//! Mask-driven cropping and page painting
//!
//! For every retained tracing the compositor:
//! - stamps the tracing's footprint (filled polygon or bounding rectangle)
//!   into a page-sized mask,
//! - isolates the footprint with alpha and crops it to the bounding box,
//! - pads the crop symmetrically with the configured fill,
//! - restores the source channel layout unless the fill is transparent,
//! - paints the footprint on the page copy with the fill.
//!
//! The page copy is threaded through the loop as a fold accumulator. Fills are
//! identical and footprints come from non-nested boxes, so the order of the
//! records does not change the page.

use opencv::{
    core::{copy_make_border, Mat, Point, Scalar, Size, Vector, BORDER_CONSTANT, CV_8UC1},
    imgproc::{draw_contours, rectangle, FILLED, LINE_8},
    prelude::*,
};

use crate::compositing::alpha::{from_bgra, isolate, to_bgra};
use crate::config::{BorderFill, CropMode, SegmentConfig};
use crate::constants::compositing::PADDING_RATIO;
use crate::detection::ObjectRecord;
use crate::error::{Result, SegmentError};
use crate::geometry::BoundingBox;
use crate::image_loader::ChannelLayout;

/// One cropped tracing
#[derive(Debug)]
pub struct CroppedOutput {
    /// Padded crop in the output layout
    pub image: Mat,
    /// Box of the tracing on the page, before padding
    pub bbox: BoundingBox,
}

/// Crops plus the painted page
#[derive(Debug)]
pub struct CompositeResult {
    pub crops: Vec<CroppedOutput>,
    pub page: Mat,
}

/// Compositor for one crop mode and fill
pub struct Compositor {
    mode: CropMode,
    fill: BorderFill,
    padding_ratio: f64,
}

impl Compositor {
    /// Create a compositor with the default padding ratio
    pub fn new(mode: CropMode, fill: BorderFill) -> Self {
        Self {
            mode,
            fill,
            padding_ratio: PADDING_RATIO,
        }
    }

    /// Create a compositor with a custom padding ratio
    pub fn with_padding(mode: CropMode, fill: BorderFill, padding_ratio: f64) -> Self {
        Self {
            mode,
            fill,
            padding_ratio,
        }
    }

    pub fn from_config(config: &SegmentConfig) -> Self {
        Self::with_padding(config.crop_mode, config.border_fill, config.padding_ratio)
    }

    /// Padding for a box as (vertical, horizontal) pixels per side
    pub fn padding_for(&self, bbox: &BoundingBox) -> (i32, i32) {
        (
            (bbox.height as f64 * self.padding_ratio).floor() as i32,
            (bbox.width as f64 * self.padding_ratio).floor() as i32,
        )
    }

    /// Crop every record and paint the page
    ///
    /// # Arguments
    ///
    /// * `original` - Source page in `layout`
    /// * `layout` - Channel layout of `original`
    /// * `records` - Classified, merged tracings
    pub fn composite(
        &self,
        original: &Mat,
        layout: ChannelLayout,
        records: &[ObjectRecord],
    ) -> Result<CompositeResult> {
        let page = self.initial_page(original, layout)?;

        let (crops, page) = records.iter().try_fold(
            (Vec::with_capacity(records.len()), page),
            |(mut crops, page), record| {
                let (crop, page) = self.render(original, layout, record, page)?;
                crops.push(crop);
                Ok::<_, SegmentError>((crops, page))
            },
        )?;

        log::debug!("Composited {} crops ({:?}, {:?} fill)", crops.len(), self.mode, self.fill);
        Ok(CompositeResult { crops, page })
    }

    /// Page accumulator before any painting.
    ///
    /// A transparent fill needs an alpha channel on the page as well.
    fn initial_page(&self, original: &Mat, layout: ChannelLayout) -> Result<Mat> {
        if self.fill.is_transparent() {
            to_bgra(original, layout)
        } else {
            original
                .try_clone()
                .map_err(|e| SegmentError::opencv("page copy", e))
        }
    }

    fn render(
        &self,
        original: &Mat,
        layout: ChannelLayout,
        record: &ObjectRecord,
        mut page: Mat,
    ) -> Result<(CroppedOutput, Mat)> {
        let bbox = record.bbox();
        let rect = bbox.to_rect();
        let footprint = self.footprint(original.size().map_err(|e| SegmentError::opencv("page size", e))?, record)?;

        let content = Mat::roi(original, rect)
            .and_then(|roi| roi.try_clone())
            .map_err(|e| SegmentError::opencv("content crop", e))?;
        let local_footprint = Mat::roi(&footprint, rect)
            .and_then(|roi| roi.try_clone())
            .map_err(|e| SegmentError::opencv("mask crop", e))?;

        let isolated = isolate(&content, layout, &local_footprint)?;
        let padded = self.pad(&isolated, &bbox)?;
        let image = if self.fill.is_transparent() {
            padded
        } else {
            from_bgra(padded, layout)?
        };

        page.set_to(&self.fill_scalar(), &footprint)
            .map_err(|e| SegmentError::opencv("page paint", e))?;

        Ok((CroppedOutput { image, bbox }, page))
    }

    /// Page-sized single-channel mask, 255 inside the tracing
    fn footprint(&self, size: Size, record: &ObjectRecord) -> Result<Mat> {
        let mut mask = Mat::new_rows_cols_with_default(size.height, size.width, CV_8UC1, Scalar::all(0.0))
            .map_err(|e| SegmentError::opencv("mask creation", e))?;

        match self.mode {
            CropMode::Polygon => {
                let mut contours = Vector::<Vector<Point>>::new();
                contours.push(record.contour().iter().copied().collect());
                draw_contours(
                    &mut mask,
                    &contours,
                    0,
                    Scalar::all(255.0),
                    FILLED,
                    LINE_8,
                    &Mat::default(),
                    i32::MAX,
                    Point::new(0, 0),
                )
                .map_err(|e| SegmentError::opencv("polygon stamp", e))?;
            }
            CropMode::Rectangle => {
                rectangle(&mut mask, record.bbox().to_rect(), Scalar::all(255.0), FILLED, LINE_8, 0)
                    .map_err(|e| SegmentError::opencv("rectangle stamp", e))?;
            }
        }

        Ok(mask)
    }

    fn pad(&self, isolated: &Mat, bbox: &BoundingBox) -> Result<Mat> {
        let (vertical, horizontal) = self.padding_for(bbox);
        let mut padded = Mat::default();
        copy_make_border(
            isolated,
            &mut padded,
            vertical,
            vertical,
            horizontal,
            horizontal,
            BORDER_CONSTANT,
            self.fill_scalar(),
        )
        .map_err(|e| SegmentError::opencv("padding", e))?;
        Ok(padded)
    }

    /// Fill as a BGRA scalar; single-channel rasters read the first sample
    fn fill_scalar(&self) -> Scalar {
        let [b, g, r, a] = self.fill.bgra();
        Scalar::new(b, g, r, a)
    }
}
