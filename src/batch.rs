//! Batch processing with per-page failure isolation
//!
//! A bad page never aborts the batch: its error is logged with the page
//! identifier and collected in the [`BatchReport`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SegmentError};
use crate::image_loader::{is_supported_extension, RasterInput};
use crate::output::OutputWriter;
use crate::pipeline::Segmenter;

/// Successfully processed page
#[derive(Debug)]
pub struct PageSummary {
    pub id: String,
    pub objects: usize,
    pub written: Vec<PathBuf>,
}

/// Page that failed, with the reason
#[derive(Debug)]
pub struct BatchFailure {
    pub id: String,
    pub error: SegmentError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<PageSummary>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Tracings found across all processed pages
    pub fn total_objects(&self) -> usize {
        self.processed.iter().map(|page| page.objects).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Segment and persist every `(page id, input)` pair
pub fn run_batch<I>(items: I, segmenter: &Segmenter, writer: &OutputWriter) -> BatchReport
where
    I: IntoIterator<Item = (String, RasterInput)>,
{
    let mut report = BatchReport::default();

    for (id, input) in items {
        let outcome = segmenter
            .segment(input)
            .and_then(|result| Ok((result.len(), writer.write(&id, &result)?)));

        match outcome {
            Ok((objects, written)) => {
                log::info!("Page {}: {} tracings", id, objects);
                report.processed.push(PageSummary { id, objects, written });
            }
            Err(error) => {
                log::warn!("Page {} failed: {}", id, error);
                report.failed.push(BatchFailure { id, error });
            }
        }
    }

    log::info!(
        "Batch finished: {} pages, {} tracings, {} failures",
        report.processed.len(),
        report.total_objects(),
        report.failed.len()
    );
    report
}

/// Page identifier of an image file: its name without extension
pub fn page_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("page")
        .to_string()
}

/// Supported image files at `path`: the file itself, or a sorted directory listing
pub fn discover_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return if has_supported_extension(path) {
            Ok(vec![path.to_path_buf()])
        } else {
            Err(SegmentError::InvalidInputType {
                reason: format!("unsupported image file: {}", path.display()),
            })
        };
    }
    if !path.is_dir() {
        return Err(SegmentError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let entries = fs::read_dir(path).map_err(|e| SegmentError::io(path, e))?;
    let mut images = Vec::new();
    for entry in entries {
        let file = entry.map_err(|e| SegmentError::io(path, e))?.path();
        if file.is_file() && has_supported_extension(&file) {
            images.push(file);
        }
    }
    images.sort();
    Ok(images)
}

/// Batch items for a list of image files.
///
/// Files sharing a stem (`12.png`, `12.tif`) would write to the same keys, so
/// their ids carry the extension as well (`12_png`, `12_tif`).
pub fn path_items(paths: &[PathBuf]) -> Vec<(String, RasterInput)> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *stem_counts.entry(page_id(path)).or_default() += 1;
    }

    paths
        .iter()
        .map(|path| {
            let stem = page_id(path);
            let id = match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if stem_counts[&stem] > 1 => {
                    let id = format!("{}_{}", stem, ext);
                    log::warn!("Page id '{}' is shared by several files; using '{}' for {}", stem, id, path.display());
                    id
                }
                _ => stem,
            };
            (id, RasterInput::from(path.clone()))
        })
        .collect()
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(is_supported_extension)
        .unwrap_or(false)
}
