//! Batch CLI for rubbing_scan with JSON configuration
//!
//! Segments every page image in a directory. A page that fails is reported
//! and skipped; the rest of the batch still runs.

use rubbing_scan::{
    batch::{discover_images, path_items, run_batch},
    BatchConfig, OutputWriter, Segmenter,
};
use std::{env, path::Path, process};

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help(&args[0]);
        process::exit(1);
    }

    let config_path = Path::new(&args[1]);

    if !config_path.exists() {
        eprintln!("Error: Config file '{}' does not exist", config_path.display());
        process::exit(1);
    }

    let config = match BatchConfig::from_json_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config file: {}", e);
            process::exit(1);
        }
    };

    eprintln!("Loaded configuration from {}", config_path.display());
    eprintln!("Input path: {}", config.input_path.display());
    eprintln!("Output path: {}", config.output_path.display());
    eprintln!();

    let image_files = match discover_images(&config.input_path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error finding image files: {}", e);
            process::exit(1);
        }
    };

    if image_files.is_empty() {
        eprintln!("No image files found in {}", config.input_path.display());
        process::exit(1);
    }

    eprintln!("Found {} image files to process", image_files.len());
    eprintln!();

    let segmenter = match Segmenter::new(config.segmentation.clone()) {
        Ok(segmenter) => segmenter,
        Err(e) => {
            eprintln!("Invalid segmentation parameters: {}", e);
            process::exit(1);
        }
    };
    let seg = segmenter.config();
    eprintln!(
        "Segmenting with {:?} crops, {:?} fill, min size {}x{}",
        seg.crop_mode, seg.border_fill, seg.size_threshold.min_width, seg.size_threshold.min_height
    );
    let writer = OutputWriter::new(&config.output_path, config.only_objects);

    let report = run_batch(path_items(&image_files), &segmenter, &writer);

    if env::var("VERBOSE").is_ok() {
        for page in &report.processed {
            eprintln!("  {} → {} tracings, {} files", page.id, page.objects, page.written.len());
        }
    }

    eprintln!();
    eprintln!("Batch processing complete:");
    eprintln!("  Pages: {}", report.processed.len());
    eprintln!("  Tracings: {}", report.total_objects());
    eprintln!("  Errors: {}", report.failed.len());
    for failure in &report.failed {
        eprintln!("    ✗ {}: {}", failure.id, failure.error);
    }
    eprintln!("  Results saved to: {}", config.output_path.display());

    if !report.is_clean() {
        process::exit(1);
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} <config.json>", program_name);
    eprintln!();
    eprintln!("Batch extract rubbing tracings from scanned pages using JSON configuration.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json    JSON file containing batch configuration");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VERBOSE=1      Print per-page results");
    eprintln!("  RUST_LOG=debug Log every pipeline stage");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} batch.json", program_name);
    eprintln!("  VERBOSE=1 {} batch.json", program_name);
}
