//! Build script for scanline-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates video.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use scanline_core::config::VideoConfig;
use scanline_core::controller::TimingPlan;

/// PIO clock ticks per pixel in the RP2040 pixel program
const PIXEL_TICKS_PER_SAMPLE: u32 = 2;

/// Ticks each sync phase spends outside its counted loop in the PIO program
const SYNC_PHASE_OVERHEAD: [u32; 3] = [2, 1, 1];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate video.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=video.toml");

    let config_path = Path::new("video.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: video.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds its video timing from video.toml.           ║\n\
            ║  Please create one in the scanline-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read video.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Same types the firmware parses into, so section and key names match
    let config: VideoConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid video.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();

    // Covers the clock dividers as well as the raster timing
    match TimingPlan::new(&config, PIXEL_TICKS_PER_SAMPLE) {
        Ok(plan) => {
            // Each phase must outlast the fixed instructions around its loop
            if let Err(e) = plan.sync_loop_counts(SYNC_PHASE_OVERHEAD) {
                errors.push(format!(
                    "sync phases {:?} / {:?} rejected: {:?}",
                    plan.mode.horizontal.phases(),
                    plan.mode.vertical.phases(),
                    e
                ));
            }

            if !plan.clocks.is_integral() {
                errors.push(format!(
                    "[clock] system_hz {} gives fractional PIO dividers",
                    config.clock.system_hz
                ));
            }
        }
        Err(e) => errors.push(format!("timing rejected: {:?}", e)),
    }

    // The PIO pixel program shifts four samples per FIFO word
    if config.mode.width % 4 != 0 {
        errors.push(format!(
            "[mode] width {} must be a multiple of 4",
            config.mode.width
        ));
    }

    if config.clock.system_hz == 0 {
        errors.push("[clock] system_hz must be non-zero".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid video configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=video.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
