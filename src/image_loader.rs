//! Raster loading for every accepted input shape
//!
//! A page can reach the pipeline as a path on disk, an already decoded
//! [`image::DynamicImage`], or a raw OpenCV [`Mat`]. [`load_raster`] resolves
//! that choice once and hands the rest of the pipeline a [`LoadedRaster`]:
//! the original raster at its native channel count plus a grayscale copy used
//! for analysis.
//!
//! ## Design
//!
//! Color rasters are converted to OpenCV's BGR / BGRA channel order, so every
//! downstream `imgproc` call can use the standard color codes. Grayscale and
//! alpha-carrying inputs keep their channel count; the compositor relies on it
//! to return crops in the same layout as the source.

use image::{DynamicImage, ImageReader};
use opencv::{
    core::{Mat, Scalar, CV_8U, CV_8UC1, CV_8UC3, CV_8UC4},
    imgproc::{cvt_color_def, COLOR_BGR2GRAY, COLOR_BGRA2GRAY},
    prelude::*,
};
use std::path::{Path, PathBuf};

use crate::error::{Result, SegmentError};

/// Channel arrangement of an 8-bit raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Single channel
    Gray,
    /// Three channels, blue first
    Bgr,
    /// Four channels, blue first, alpha last
    Bgra,
}

impl ChannelLayout {
    /// Layout for a channel count, if supported
    pub fn from_channels(channels: i32) -> Option<Self> {
        match channels {
            1 => Some(ChannelLayout::Gray),
            3 => Some(ChannelLayout::Bgr),
            4 => Some(ChannelLayout::Bgra),
            _ => None,
        }
    }

    pub fn channels(&self) -> i32 {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Bgr => 3,
            ChannelLayout::Bgra => 4,
        }
    }

    /// True for multi-channel sources
    pub fn is_color(&self) -> bool {
        !matches!(self, ChannelLayout::Gray)
    }

    /// OpenCV matrix type for this layout
    pub fn mat_type(&self) -> i32 {
        match self {
            ChannelLayout::Gray => CV_8UC1,
            ChannelLayout::Bgr => CV_8UC3,
            ChannelLayout::Bgra => CV_8UC4,
        }
    }
}

/// Accepted raster sources
#[derive(Debug)]
pub enum RasterInput {
    /// Image file on disk
    Path(PathBuf),
    /// Decoded image (RGB channel order)
    Image(DynamicImage),
    /// Raw 8-bit OpenCV raster (BGR channel order for color)
    Array(Mat),
}

impl From<&Path> for RasterInput {
    fn from(path: &Path) -> Self {
        RasterInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for RasterInput {
    fn from(path: PathBuf) -> Self {
        RasterInput::Path(path)
    }
}

impl From<DynamicImage> for RasterInput {
    fn from(image: DynamicImage) -> Self {
        RasterInput::Image(image)
    }
}

impl From<Mat> for RasterInput {
    fn from(mat: Mat) -> Self {
        RasterInput::Array(mat)
    }
}

/// Original raster plus its grayscale derivative
#[derive(Debug)]
pub struct LoadedRaster {
    /// Source raster at its native channel count
    pub original: Mat,
    /// Single-channel raster used for classification
    pub gray: Mat,
    /// Channel layout of `original`
    pub layout: ChannelLayout,
}

/// Load any accepted input into a [`LoadedRaster`]
///
/// # Errors
///
/// - `InputNotFound` if a path does not point to a file
/// - `ImageLoadError` if the file cannot be decoded
/// - `InvalidInputType` if a raw raster is empty, not 8-bit, or has a
///   channel count other than 1, 3 or 4
///
/// # Example
///
/// ```rust,no_run
/// use rubbing_scan::image_loader::{load_raster, RasterInput};
/// use std::path::Path;
///
/// let raster = load_raster(RasterInput::from(Path::new("page.png")))?;
/// println!("Loaded {:?} page", raster.layout);
/// # Ok::<(), rubbing_scan::SegmentError>(())
/// ```
pub fn load_raster(input: RasterInput) -> Result<LoadedRaster> {
    let original = match input {
        RasterInput::Path(path) => load_path(&path)?,
        RasterInput::Image(image) => image_to_mat(&image)?,
        RasterInput::Array(mat) => {
            validate_array(&mat)?;
            mat
        }
    };

    let layout = ChannelLayout::from_channels(original.channels()).ok_or_else(|| {
        SegmentError::InvalidInputType {
            reason: format!("{} channels", original.channels()),
        }
    })?;
    let gray = to_gray(&original, layout)?;

    Ok(LoadedRaster {
        original,
        gray,
        layout,
    })
}

/// Decode an image file through the `image` crate
fn load_path(path: &Path) -> Result<Mat> {
    if !path.is_file() {
        return Err(SegmentError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = ImageReader::open(path)
        .map_err(|e| SegmentError::image_load(format!("Failed to open image file: {}", path.display()), e))?
        .with_guessed_format()
        .map_err(|e| SegmentError::image_load(format!("Failed to read image file: {}", path.display()), e))?;

    let image = reader
        .decode()
        .map_err(|e| SegmentError::image_load(format!("Failed to decode image: {}", path.display()), e))?;

    image_to_mat(&image)
}

/// Convert a decoded image to an 8-bit Mat, keeping gray and alpha layouts
pub fn image_to_mat(image: &DynamicImage) -> Result<Mat> {
    let color = image.color();
    let (width, height) = (image.width(), image.height());

    if color.has_alpha() {
        let mut bytes = image.to_rgba8().into_raw();
        for px in bytes.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        bytes_to_mat(&bytes, width, height, ChannelLayout::Bgra)
    } else if color.has_color() {
        let mut bytes = image.to_rgb8().into_raw();
        for px in bytes.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        bytes_to_mat(&bytes, width, height, ChannelLayout::Bgr)
    } else {
        let bytes = image.to_luma8().into_raw();
        bytes_to_mat(&bytes, width, height, ChannelLayout::Gray)
    }
}

/// Copy an interleaved byte buffer into a new continuous Mat
fn bytes_to_mat(bytes: &[u8], width: u32, height: u32, layout: ChannelLayout) -> Result<Mat> {
    if width == 0 || height == 0 {
        return Err(SegmentError::InvalidInputType {
            reason: "image has zero width or height".into(),
        });
    }

    let mut mat = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        layout.mat_type(),
        Scalar::all(0.0),
    )
    .map_err(|e| SegmentError::opencv("allocate raster", e))?;

    mat.data_bytes_mut()
        .map_err(|e| SegmentError::opencv("access raster data", e))?
        .copy_from_slice(bytes);

    Ok(mat)
}

fn validate_array(mat: &Mat) -> Result<()> {
    if mat.empty() {
        return Err(SegmentError::InvalidInputType {
            reason: "raster is empty".into(),
        });
    }
    if mat.depth() != CV_8U {
        return Err(SegmentError::InvalidInputType {
            reason: format!("unsupported sample depth {} (expected 8-bit)", mat.depth()),
        });
    }
    if ChannelLayout::from_channels(mat.channels()).is_none() {
        return Err(SegmentError::InvalidInputType {
            reason: format!("{} channels (expected 1, 3 or 4)", mat.channels()),
        });
    }
    Ok(())
}

fn to_gray(original: &Mat, layout: ChannelLayout) -> Result<Mat> {
    let code = match layout {
        ChannelLayout::Gray => {
            return original
                .try_clone()
                .map_err(|e| SegmentError::opencv("copy grayscale raster", e));
        }
        ChannelLayout::Bgr => COLOR_BGR2GRAY,
        ChannelLayout::Bgra => COLOR_BGRA2GRAY,
    };

    let mut gray = Mat::default();
    cvt_color_def(original, &mut gray, code)
        .map_err(|e| SegmentError::opencv("grayscale conversion", e))?;
    Ok(gray)
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_channel_layout() {
        assert_eq!(ChannelLayout::from_channels(1), Some(ChannelLayout::Gray));
        assert_eq!(ChannelLayout::from_channels(3), Some(ChannelLayout::Bgr));
        assert_eq!(ChannelLayout::from_channels(4), Some(ChannelLayout::Bgra));
        assert_eq!(ChannelLayout::from_channels(2), None);
        assert!(!ChannelLayout::Gray.is_color());
        assert!(ChannelLayout::Bgra.is_color());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("png"));
        assert!(is_supported_extension("JPEG"));
        assert!(is_supported_extension("tif"));
        assert!(!is_supported_extension("pdf"));
        assert!(!is_supported_extension("heic"));
    }

    #[test]
    fn test_rgb_image_becomes_bgr() {
        // 2x2 image: red, green, blue, white
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));
        img.put_pixel(1, 1, Rgb([255, 255, 255]));

        let raster = load_raster(RasterInput::from(DynamicImage::ImageRgb8(img))).unwrap();
        assert_eq!(raster.layout, ChannelLayout::Bgr);
        assert_eq!(raster.gray.channels(), 1);

        let red: &opencv::core::Vec3b = raster.original.at_2d(0, 0).unwrap();
        assert_eq!((red[0], red[1], red[2]), (0, 0, 255));

        let blue: &opencv::core::Vec3b = raster.original.at_2d(1, 0).unwrap();
        assert_eq!((blue[0], blue[1], blue[2]), (255, 0, 0));

        let white: &u8 = raster.gray.at_2d(1, 1).unwrap();
        assert_eq!(*white, 255);
    }

    #[test]
    fn test_gray_and_alpha_layouts_preserved() {
        let gray = GrayImage::from_pixel(4, 3, Luma([128]));
        let raster = load_raster(DynamicImage::ImageLuma8(gray).into()).unwrap();
        assert_eq!(raster.layout, ChannelLayout::Gray);
        assert_eq!((raster.original.cols(), raster.original.rows()), (4, 3));

        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40]));
        let raster = load_raster(DynamicImage::ImageRgba8(rgba).into()).unwrap();
        assert_eq!(raster.layout, ChannelLayout::Bgra);
        let px: &opencv::core::Vec4b = raster.original.at_2d(0, 0).unwrap();
        assert_eq!((px[0], px[1], px[2], px[3]), (30, 20, 10, 40));
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let result = load_raster(RasterInput::from(Path::new("no/such/page.png")));
        assert!(matches!(result, Err(SegmentError::InputNotFound { .. })));
    }

    #[test]
    fn test_two_channel_array_rejected() {
        let mat = Mat::new_rows_cols_with_default(4, 4, opencv::core::CV_8UC2, Scalar::all(0.0)).unwrap();
        let result = load_raster(RasterInput::Array(mat));
        assert!(matches!(result, Err(SegmentError::InvalidInputType { .. })));
    }

    #[test]
    fn test_float_array_rejected() {
        let mat = Mat::new_rows_cols_with_default(4, 4, opencv::core::CV_32FC1, Scalar::all(0.0)).unwrap();
        let result = load_raster(RasterInput::Array(mat));
        assert!(matches!(result, Err(SegmentError::InvalidInputType { .. })));
    }

    #[test]
    fn test_empty_array_rejected() {
        let result = load_raster(RasterInput::Array(Mat::default()));
        assert!(matches!(result, Err(SegmentError::InvalidInputType { .. })));
    }

    #[test]
    fn test_array_input_passes_through() {
        let mat = Mat::new_rows_cols_with_default(5, 6, CV_8UC3, Scalar::new(1.0, 2.0, 3.0, 0.0)).unwrap();
        let raster = load_raster(RasterInput::Array(mat)).unwrap();
        assert_eq!(raster.layout, ChannelLayout::Bgr);
        assert_eq!((raster.gray.cols(), raster.gray.rows()), (6, 5));
    }
}
