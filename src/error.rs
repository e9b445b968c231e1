//! Error types for the rubbing_scan library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rubbing_scan operations
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Error types for segmentation, compositing and persistence
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Input path does not resolve to a file
    #[error("Input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Input value is not a supported raster shape
    #[error("Invalid input type: {reason}")]
    InvalidInputType { reason: String },

    /// Image file could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration parameter
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// OpenCV operation failed
    #[error("OpenCV error: {operation}")]
    OpenCvError {
        operation: String,
        #[source]
        source: Option<opencv::Error>,
    },

    /// Two objects on one page were matched to the same label
    #[error("Label collision on page {page}: '{label}' is already assigned")]
    LabelCollision { page: String, label: String },

    /// Label cannot be used as a file name
    #[error("Invalid label on page {page}: '{label}'")]
    InvalidLabel { page: String, label: String },

    /// Filesystem operation failed while persisting outputs
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SegmentError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCvError {
            operation: operation.into(),
            source: Some(source),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create an I/O error bound to the path it happened at
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error can be skipped while the rest of a batch continues
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SegmentError::LabelCollision { .. } | SegmentError::InvalidLabel { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            SegmentError::InputNotFound { path } => {
                format!(
                    "Image file '{}' was not found. Make sure the path to the image is correct.",
                    path.display()
                )
            }
            SegmentError::InvalidInputType { .. } => {
                "Unsupported input. Provide an image path, a decoded image, or an 8-bit raster with 1, 3 or 4 channels.".to_string()
            }
            SegmentError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            SegmentError::InvalidParameter { parameter, value } => {
                format!("Configuration value '{}' for {} is not allowed.", value, parameter)
            }
            SegmentError::LabelCollision { label, .. } => {
                format!(
                    "Several tracings were assigned the label '{}'. Please check them manually.",
                    label
                )
            }
            SegmentError::InvalidLabel { label, .. } => {
                format!(
                    "The label '{}' cannot be used as a file name. The crop keeps its box name.",
                    label
                )
            }
            _ => "Segmentation failed. Please try with a different image.".to_string(),
        }
    }
}
