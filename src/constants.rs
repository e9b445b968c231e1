//! Default segmentation parameters
//!
//! Values are tuned for high-contrast rubbing scans rendered at around 600 DPI.

/// Morphology and binarization
pub mod morphology {
    /// Side of the square erosion kernel in pixels (must be odd)
    pub const EROSION_KERNEL_SIZE: i32 = 21;

    /// Maximum value assigned to foreground pixels by the threshold
    pub const BINARY_MAX_VALUE: f64 = 255.0;
}

/// Tracing vs. label classification
pub mod classification {
    /// Bounding box width above which a contour counts as a tracing
    pub const MIN_OBJECT_WIDTH: i32 = 200;

    /// Bounding box height above which a contour counts as a tracing
    pub const MIN_OBJECT_HEIGHT: i32 = 150;

    /// Width/height ratio at or above which a contour is a title band
    pub const MAX_ASPECT_RATIO: f64 = 5.0;
}

/// Cropping and padding
pub mod compositing {
    /// Padding added on each side, as a fraction of the box dimension
    pub const PADDING_RATIO: f64 = 0.15;

    /// Sample value of a white pixel
    pub const WHITE: f64 = 255.0;

    /// Sample value of an opaque alpha channel
    pub const OPAQUE: f64 = 255.0;
}
