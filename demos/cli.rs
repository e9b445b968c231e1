//! Command-line interface for rubbing_scan
//!
//! Segments one scanned page and writes its crops (and optionally the painted
//! page) below an output directory.

use rubbing_scan::{
    labeling::{assign_labels, page_scale, TextBox},
    segment, segment_debug, BorderFill, CropMode, OutputWriter, RasterInput, SegmentConfig,
    SegmentationDebug, SegmentationResult,
};
use opencv::prelude::*;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

/// Word boxes of the page as exported by a text layout extractor
#[derive(Debug, Deserialize)]
struct PageWords {
    width: f64,
    height: f64,
    words: Vec<TextBox>,
}

struct Options {
    image_path: PathBuf,
    output_dir: PathBuf,
    labels_path: Option<PathBuf>,
    keep_page: bool,
    debug: bool,
    config: SegmentConfig,
}

fn main() {
    env_logger::Builder::from_default_env().init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    if !options.image_path.exists() {
        eprintln!("Error: File '{}' does not exist", options.image_path.display());
        process::exit(1);
    }

    let page_id = rubbing_scan::batch::page_id(&options.image_path);
    let input = RasterInput::from(options.image_path.clone());

    let outcome = if options.debug {
        segment_debug(input, &options.config).map(|(result, debug)| {
            save_debug_output(&debug, &options.output_dir.join("debug"), &page_id);
            result
        })
    } else {
        segment(input, &options.config)
    };

    let result = match outcome {
        Ok(result) => result,
        Err(error) => {
            eprintln!("Segmentation failed: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    };

    print_result(&page_id, &result);

    let writer = OutputWriter::new(&options.output_dir, !options.keep_page);
    if let Err(e) = writer.write(&page_id, &result) {
        eprintln!("Error writing results: {}", e);
        process::exit(1);
    }

    if let Some(labels_path) = &options.labels_path {
        apply_labels(&writer, &page_id, &result, labels_path);
    }
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        image_path: PathBuf::new(),
        output_dir: PathBuf::from("output"),
        labels_path: None,
        keep_page: false,
        debug: false,
        config: SegmentConfig::default(),
    };
    let mut image_path_arg = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                options.config.crop_mode = match next_value(args, &mut i) {
                    "rect" => CropMode::Rectangle,
                    "poly" => CropMode::Polygon,
                    other => fail(&format!("Unknown crop mode '{}'", other)),
                };
            }
            "--fill" => {
                options.config.border_fill = match next_value(args, &mut i) {
                    "white" => BorderFill::White,
                    "black" => BorderFill::Black,
                    "transparent" => BorderFill::Transparent,
                    other => fail(&format!("Unknown fill '{}'", other)),
                };
            }
            "--min-size" => {
                let width = parse_number(next_value(args, &mut i));
                let height = parse_number(next_value(args, &mut i));
                options.config.size_threshold = (width, height).into();
            }
            "--output" | "-o" => {
                options.output_dir = PathBuf::from(next_value(args, &mut i));
            }
            "--labels" => {
                options.labels_path = Some(PathBuf::from(next_value(args, &mut i)));
            }
            "--keep-page" => options.keep_page = true,
            "--debug" => options.debug = true,
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    fail("Multiple image paths provided");
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    match image_path_arg {
        Some(path) => options.image_path = PathBuf::from(path),
        None => {
            print_help(&args[0]);
            process::exit(1);
        }
    }
    options
}

fn next_value<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(value) => value.as_str(),
        None => fail(&format!("Missing value for {}", args[*i - 1])),
    }
}

fn parse_number(value: &str) -> i32 {
    value
        .parse()
        .unwrap_or_else(|_| fail(&format!("Not a pixel count: '{}'", value)))
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Extract rubbing tracings from a scanned page.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --mode rect|poly              Crop footprint (default: rect)");
    eprintln!("  --fill white|black|transparent");
    eprintln!("                                Padding and page paint (default: white)");
    eprintln!("  --min-size W H                Size threshold in pixels (default: 200 150)");
    eprintln!("  --output, -o DIR              Output root (default: output/)");
    eprintln!("  --labels FILE                 JSON word boxes used to name the crops");
    eprintln!("  --keep-page                   Also write the painted page");
    eprintln!("  --debug                       Save the eroded and binary rasters");
    eprintln!("  --help, -h                    Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG=debug                Log every pipeline stage");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} scans/12.png", program_name);
    eprintln!("  {} --mode poly --fill transparent scans/12.png", program_name);
    eprintln!("  {} --labels scans/12.json --keep-page scans/12.png", program_name);
}

fn apply_labels(writer: &OutputWriter, page_id: &str, result: &SegmentationResult, labels_path: &Path) {
    let words: PageWords = match fs::read_to_string(labels_path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
    {
        Ok(words) => words,
        Err(e) => {
            eprintln!("Warning: Failed to read labels from {}: {}", labels_path.display(), e);
            return;
        }
    };

    let raster_size = (result.page.cols() as u32, result.page.rows() as u32);
    let scale = page_scale(raster_size, (words.width, words.height));
    let boxes = result.boxes();
    let labels = assign_labels(&boxes, &words.words, scale);

    for outcome in writer.apply_labels(page_id, &boxes, &labels) {
        match outcome {
            Ok(path) => eprintln!("  → {}", path.display()),
            Err(e) => eprintln!("  ✗ {}", e),
        }
    }
}

fn save_debug_output(debug: &SegmentationDebug, output_dir: &Path, page_id: &str) {
    use opencv::core::Vector;
    use opencv::imgcodecs;

    if let Err(e) = fs::create_dir_all(output_dir) {
        eprintln!("Warning: Failed to create debug directory: {}", e);
        return;
    }

    let rasters = [("eroded", &debug.eroded), ("binary", &debug.binary)];
    for (name, raster) in rasters {
        let path = output_dir.join(format!("{}_{}.png", page_id, name));
        let Some(path_str) = path.to_str() else {
            eprintln!("Warning: Skipping non UTF-8 path {}", path.display());
            continue;
        };
        match imgcodecs::imwrite(path_str, raster, &Vector::new()) {
            Ok(_) => eprintln!("Debug: Saved {} raster to {}", name, path.display()),
            Err(e) => eprintln!("Warning: Failed to save {} raster: {}", name, e),
        }
    }

    eprintln!(
        "Debug: {:?} page, Otsu threshold {:.0}, {} contours, {} classified",
        debug.layout, debug.threshold, debug.contour_count, debug.classified_count
    );
}

fn print_result(page_id: &str, result: &SegmentationResult) {
    // Boxes as JSON on stdout for programmatic use
    match serde_json::to_string_pretty(&result.boxes()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing boxes: {}", e),
    }

    eprintln!();
    eprintln!("Page {}: {} tracings", page_id, result.len());
    for (bbox, image) in result.boxes().iter().zip(result.images()) {
        eprintln!("  {} → {}x{}", bbox, image.cols(), image.rows());
    }
}
