//! Generate a default batch configuration file
//!
//! Creates a JSON config with all default segmentation parameters

use rubbing_scan::BatchConfig;
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} runs/rubbings/config.json", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = BatchConfig::default();

    match config.to_json_file(output_path) {
        Ok(_) => {
            let seg = &config.segmentation;
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!("  Input:  {}", config.input_path.display());
            eprintln!("  Output: {}", config.output_path.display());
            eprintln!("  Pages written: {}", if config.only_objects { "no" } else { "yes" });
            eprintln!(
                "  Size threshold: {}x{} px, max aspect {:.1}",
                seg.size_threshold.min_width, seg.size_threshold.min_height, seg.max_aspect_ratio
            );
            eprintln!(
                "  Erosion kernel: {}x{}, padding {:.0}%",
                seg.erosion_kernel_size,
                seg.erosion_kernel_size,
                seg.padding_ratio * 100.0
            );
            eprintln!("  Crop mode: {:?}, fill: {:?}", seg.crop_mode, seg.border_fill);
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
