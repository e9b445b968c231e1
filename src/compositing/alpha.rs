//! Inverted-mask alpha compositing
//!
//! The content is promoted to four channels with its own alpha zeroed. A white,
//! fully transparent canvas gets the footprint stamped as opaque black. Adding
//! the two with saturation leaves the original samples and alpha 255 inside the
//! footprint, and transparent white everywhere else.

use opencv::{
    core::{add, merge, split, Mat, Scalar, Vector, CV_8UC1, CV_8UC4},
    imgproc::{cvt_color_def, COLOR_BGR2BGRA, COLOR_BGRA2BGR, COLOR_BGRA2GRAY, COLOR_GRAY2BGRA},
    prelude::*,
};

use crate::constants::compositing::{OPAQUE, WHITE};
use crate::error::{Result, SegmentError};
use crate::image_loader::ChannelLayout;

const ALPHA_CHANNEL: usize = 3;

/// Promote a raster of the given layout to BGRA
pub fn to_bgra(raster: &Mat, layout: ChannelLayout) -> Result<Mat> {
    let code = match layout {
        ChannelLayout::Bgra => {
            return raster
                .try_clone()
                .map_err(|e| SegmentError::opencv("copy BGRA raster", e));
        }
        ChannelLayout::Bgr => COLOR_BGR2BGRA,
        ChannelLayout::Gray => COLOR_GRAY2BGRA,
    };

    let mut bgra = Mat::default();
    cvt_color_def(raster, &mut bgra, code).map_err(|e| SegmentError::opencv("BGRA promotion", e))?;
    Ok(bgra)
}

/// Convert a BGRA raster back to `layout`
pub fn from_bgra(bgra: Mat, layout: ChannelLayout) -> Result<Mat> {
    let code = match layout {
        ChannelLayout::Bgra => return Ok(bgra),
        ChannelLayout::Bgr => COLOR_BGRA2BGR,
        ChannelLayout::Gray => COLOR_BGRA2GRAY,
    };

    let mut converted = Mat::default();
    cvt_color_def(&bgra, &mut converted, code)
        .map_err(|e| SegmentError::opencv("BGRA reduction", e))?;
    Ok(converted)
}

/// Keep only the footprint of `content` opaque.
///
/// `footprint` is a single-channel mask of the same size as `content`, non-zero
/// inside the object.
pub fn isolate(content: &Mat, layout: ChannelLayout, footprint: &Mat) -> Result<Mat> {
    let (rows, cols) = (content.rows(), content.cols());

    let bgra = to_bgra(content, layout)?;
    let mut channels = Vector::<Mat>::new();
    split(&bgra, &mut channels).map_err(|e| SegmentError::opencv("channel split", e))?;
    let cleared = Mat::new_rows_cols_with_default(rows, cols, CV_8UC1, Scalar::all(0.0))
        .map_err(|e| SegmentError::opencv("alpha plane creation", e))?;
    channels
        .set(ALPHA_CHANNEL, cleared)
        .map_err(|e| SegmentError::opencv("alpha plane replacement", e))?;
    let mut transparent_content = Mat::default();
    merge(&channels, &mut transparent_content).map_err(|e| SegmentError::opencv("channel merge", e))?;

    let mut canvas = Mat::new_rows_cols_with_default(rows, cols, CV_8UC4, Scalar::new(WHITE, WHITE, WHITE, 0.0))
        .map_err(|e| SegmentError::opencv("canvas creation", e))?;
    canvas
        .set_to(&Scalar::new(0.0, 0.0, 0.0, OPAQUE), footprint)
        .map_err(|e| SegmentError::opencv("footprint stamp", e))?;

    let mut isolated = Mat::default();
    add(&canvas, &transparent_content, &mut isolated, &Mat::default(), -1)
        .map_err(|e| SegmentError::opencv("alpha composite", e))?;
    Ok(isolated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Vec3b, Vec4b, CV_8UC3};
    use opencv::imgproc::{rectangle, FILLED, LINE_8};

    #[test]
    fn test_isolate_keeps_footprint_opaque() {
        let content = Mat::new_rows_cols_with_default(10, 10, CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0)).unwrap();
        let mut footprint = Mat::new_rows_cols_with_default(10, 10, CV_8UC1, Scalar::all(0.0)).unwrap();
        rectangle(&mut footprint, Rect::new(0, 0, 5, 10), Scalar::all(255.0), FILLED, LINE_8, 0).unwrap();

        let isolated = isolate(&content, ChannelLayout::Bgr, &footprint).unwrap();
        assert_eq!(isolated.channels(), 4);

        let inside: &Vec4b = isolated.at_2d(5, 2).unwrap();
        assert_eq!((inside[0], inside[1], inside[2], inside[3]), (10, 20, 30, 255));

        let outside: &Vec4b = isolated.at_2d(5, 7).unwrap();
        assert_eq!((outside[0], outside[1], outside[2], outside[3]), (255, 255, 255, 0));
    }

    #[test]
    fn test_source_alpha_is_ignored() {
        let content = Mat::new_rows_cols_with_default(4, 4, CV_8UC4, Scalar::new(1.0, 2.0, 3.0, 7.0)).unwrap();
        let footprint = Mat::new_rows_cols_with_default(4, 4, CV_8UC1, Scalar::all(255.0)).unwrap();

        let isolated = isolate(&content, ChannelLayout::Bgra, &footprint).unwrap();
        let px: &Vec4b = isolated.at_2d(0, 0).unwrap();
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_layout_round_trip_keeps_samples() {
        let bgr = Mat::new_rows_cols_with_default(3, 3, CV_8UC3, Scalar::new(5.0, 6.0, 7.0, 0.0)).unwrap();
        let back = from_bgra(to_bgra(&bgr, ChannelLayout::Bgr).unwrap(), ChannelLayout::Bgr).unwrap();
        assert_eq!(back.channels(), 3);
        let px: &Vec3b = back.at_2d(1, 1).unwrap();
        assert_eq!((px[0], px[1], px[2]), (5, 6, 7));
    }
}
