//! Cropping, alpha handling and page painting

pub mod alpha;
pub mod compositor;

pub use compositor::{CompositeResult, Compositor, CroppedOutput};
