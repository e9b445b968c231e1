//! Keyed persistence of crops and painted pages
//!
//! Layout under the output root:
//!
//! ```text
//! images/{page}-[x, y, w, h].png   crop before labeling
//! images/{page}-{label}.png        crop after labeling
//! pages/{page}.png                 painted page (unless only objects are kept)
//! ```

use opencv::{core::Mat, core::Vector, imgcodecs::imwrite};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::compositing::CroppedOutput;
use crate::error::{Result, SegmentError};
use crate::geometry::BoundingBox;
use crate::pipeline::SegmentationResult;

const IMAGES_DIR: &str = "images";
const PAGES_DIR: &str = "pages";
const EXTENSION: &str = "png";

/// File name stem of a crop before labeling
pub fn crop_key(page_id: &str, bbox: &BoundingBox) -> String {
    format!("{}-{}", page_id, bbox)
}

/// File name stem of a crop after labeling
pub fn label_key(page_id: &str, label: &str) -> String {
    format!("{}-{}", page_id, label)
}

/// Writes segmentation results below a root directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    only_objects: bool,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, only_objects: bool) -> Self {
        Self {
            root: root.into(),
            only_objects,
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    /// Path of a crop before labeling
    pub fn crop_path(&self, page_id: &str, bbox: &BoundingBox) -> PathBuf {
        self.images_dir()
            .join(format!("{}.{}", crop_key(page_id, bbox), EXTENSION))
    }

    /// Path of a crop after labeling
    pub fn label_path(&self, page_id: &str, label: &str) -> PathBuf {
        self.images_dir()
            .join(format!("{}.{}", label_key(page_id, label), EXTENSION))
    }

    /// Write every crop and, unless only objects are kept, the painted page.
    ///
    /// Returns the paths written. Pages without tracings write nothing.
    pub fn write(&self, page_id: &str, result: &SegmentationResult) -> Result<Vec<PathBuf>> {
        let mut written = self.write_crops(page_id, &result.crops)?;
        if !self.only_objects && !result.is_empty() {
            written.push(self.write_page(page_id, &result.page)?);
        }
        Ok(written)
    }

    pub fn write_crops(&self, page_id: &str, crops: &[CroppedOutput]) -> Result<Vec<PathBuf>> {
        if crops.is_empty() {
            return Ok(Vec::new());
        }
        create_dir(&self.images_dir())?;

        crops
            .iter()
            .map(|crop| {
                let path = self.crop_path(page_id, &crop.bbox);
                write_png(&path, &crop.image)?;
                Ok(path)
            })
            .collect()
    }

    pub fn write_page(&self, page_id: &str, page: &Mat) -> Result<PathBuf> {
        create_dir(&self.pages_dir())?;
        let path = self.pages_dir().join(format!("{}.{}", page_id, EXTENSION));
        write_png(&path, page)?;
        Ok(path)
    }

    /// Rename crops to their labels.
    ///
    /// One result per box. Unlabeled boxes keep their crop path. A label whose
    /// file already exists is a `LabelCollision`; the crop keeps its box name
    /// and the remaining boxes are still renamed.
    pub fn apply_labels(
        &self,
        page_id: &str,
        boxes: &[BoundingBox],
        labels: &[Option<String>],
    ) -> Vec<Result<PathBuf>> {
        boxes
            .iter()
            .zip(labels)
            .map(|(bbox, label)| {
                let source = self.crop_path(page_id, bbox);
                let Some(label) = label else {
                    return Ok(source);
                };
                let outcome = self.rename_to_label(page_id, &source, label);
                if let Err(e) = &outcome {
                    log::warn!("Skipping label for {}: {}", source.display(), e);
                }
                outcome
            })
            .collect()
    }

    fn rename_to_label(&self, page_id: &str, source: &Path, label: &str) -> Result<PathBuf> {
        if !is_safe_label(label) {
            return Err(SegmentError::InvalidLabel {
                page: page_id.to_string(),
                label: label.to_string(),
            });
        }
        let target = self.label_path(page_id, label);
        if target.exists() {
            return Err(SegmentError::LabelCollision {
                page: page_id.to_string(),
                label: label.to_string(),
            });
        }
        fs::rename(source, &target).map_err(|e| SegmentError::io(source, e))?;
        Ok(target)
    }
}

/// A label must name a single file inside `images/`
fn is_safe_label(label: &str) -> bool {
    !label.trim().is_empty()
        && label != "."
        && label != ".."
        && !label.contains(['/', '\\', '\0'])
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SegmentError::io(dir, e))
}

fn write_png(path: &Path, image: &Mat) -> Result<()> {
    let path_str = path.to_str().ok_or_else(|| {
        SegmentError::io(path, io::Error::new(io::ErrorKind::InvalidInput, "path is not valid UTF-8"))
    })?;

    let written = imwrite(path_str, image, &Vector::<i32>::new())
        .map_err(|e| SegmentError::opencv(format!("write {}", path.display()), e))?;
    if !written {
        return Err(SegmentError::io(
            path,
            io::Error::new(io::ErrorKind::Other, "image encoder refused the raster"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::ChannelLayout;
    use opencv::core::{Scalar, CV_8UC3};
    use opencv::imgcodecs::{imread, IMREAD_UNCHANGED};

    fn crop(bbox: BoundingBox) -> CroppedOutput {
        CroppedOutput {
            image: Mat::new_rows_cols_with_default(8, 8, CV_8UC3, Scalar::all(200.0)).unwrap(),
            bbox,
        }
    }

    #[test]
    fn test_keys() {
        let bbox = BoundingBox::new(10, 20, 300, 400);
        assert_eq!(crop_key("12", &bbox), "12-[10, 20, 300, 400]");
        assert_eq!(label_key("12", "2048"), "12-2048");
    }

    #[test]
    fn test_write_crops_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path().join("out"), true);

        let bbox = BoundingBox::new(1, 2, 3, 4);
        let written = writer.write_crops("7", &[crop(bbox)]).unwrap();

        assert_eq!(written, vec![writer.crop_path("7", &bbox)]);
        assert!(written[0].is_file());
        assert!(!writer.pages_dir().exists());
    }

    #[test]
    fn test_labels_rename_and_collide() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), true);

        let first = BoundingBox::new(0, 0, 300, 300);
        let second = BoundingBox::new(400, 0, 300, 300);
        let third = BoundingBox::new(800, 0, 300, 300);
        writer.write_crops("3", &[crop(first), crop(second), crop(third)]).unwrap();

        let labels = vec![Some("88".to_string()), Some("88".to_string()), None];
        let outcomes = writer.apply_labels("3", &[first, second, third], &labels);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().unwrap(), &writer.label_path("3", "88"));
        assert!(matches!(outcomes[1], Err(SegmentError::LabelCollision { .. })));
        assert!(outcomes[1].as_ref().unwrap_err().is_recoverable());
        assert_eq!(outcomes[2].as_ref().unwrap(), &writer.crop_path("3", &third));

        // the colliding crop keeps its box name
        assert!(writer.crop_path("3", &second).is_file());
        assert!(writer.label_path("3", "88").is_file());
    }

    fn painted_result(bbox: BoundingBox) -> SegmentationResult {
        SegmentationResult {
            crops: vec![crop(bbox)],
            page: Mat::new_rows_cols_with_default(60, 80, CV_8UC3, Scalar::all(255.0)).unwrap(),
        }
    }

    #[test]
    fn test_write_keeps_page_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), false);

        let bbox = BoundingBox::new(5, 5, 20, 20);
        let written = writer.write("12", &painted_result(bbox)).unwrap();

        let page_path = writer.pages_dir().join("12.png");
        assert_eq!(written, vec![writer.crop_path("12", &bbox), page_path.clone()]);
        assert!(page_path.is_file());

        let decoded = imread(page_path.to_str().unwrap(), IMREAD_UNCHANGED).unwrap();
        assert_eq!(decoded.channels(), ChannelLayout::Bgr.channels());
        assert_eq!((decoded.cols(), decoded.rows()), (80, 60));
    }

    #[test]
    fn test_write_only_objects_skips_page() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), true);

        let bbox = BoundingBox::new(5, 5, 20, 20);
        let written = writer.write("12", &painted_result(bbox)).unwrap();

        assert_eq!(written, vec![writer.crop_path("12", &bbox)]);
        assert!(!writer.pages_dir().exists());
    }

    #[test]
    fn test_path_like_labels_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), true);

        let boxes = [
            BoundingBox::new(0, 0, 300, 300),
            BoundingBox::new(400, 0, 300, 300),
            BoundingBox::new(800, 0, 300, 300),
            BoundingBox::new(1200, 0, 300, 300),
        ];
        let crops: Vec<CroppedOutput> = boxes.iter().map(|bbox| crop(*bbox)).collect();
        writer.write_crops("4", &crops).unwrap();

        let labels = vec![
            Some("../escape".to_string()),
            Some("..".to_string()),
            Some("a\\b".to_string()),
            Some("17".to_string()),
        ];
        let outcomes = writer.apply_labels("4", &boxes, &labels);

        for outcome in &outcomes[..3] {
            match outcome {
                Err(e @ SegmentError::InvalidLabel { .. }) => assert!(e.is_recoverable()),
                other => panic!("Expected InvalidLabel, got: {:?}", other),
            }
        }
        assert_eq!(outcomes[3].as_ref().unwrap(), &writer.label_path("4", "17"));

        // rejected crops keep their box names, nothing lands outside images/
        for bbox in &boxes[..3] {
            assert!(writer.crop_path("4", bbox).is_file());
        }
        assert!(!dir.path().join("escape.png").exists());
    }
}
