// SPDX-License-Identifier: GPL-3.0-only

use barcode_scanner::backends::camera::list_cameras;
use barcode_scanner::config::{ScannerConfig, parse_beep_flag};
use barcode_scanner::constants::VERSION;
use barcode_scanner::constants::detection::QR_MAX_DIMENSION;
use barcode_scanner::errors::EXIT_OK;
use barcode_scanner::scanner;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "barcode-scanner")]
#[command(about = "Scan barcodes and QR codes from a webcam and print each new value once")]
#[command(version = VERSION)]
struct Cli {
    /// Camera index (/dev/video<N>)
    #[arg(default_value_t = 0)]
    camera_index: usize,

    /// Beep on new values (1/0, true/false, yes/no, on/off)
    #[arg(default_value = "1", value_parser = parse_beep_flag, action = ArgAction::Set)]
    beep: bool,

    /// Log every frame
    #[arg(short, long)]
    debug: bool,

    /// Print values only, without the camera preview
    #[arg(long)]
    no_preview: bool,

    /// JSON file mapping decoded text to a display label
    /// (default: mappings.json in the working directory, if present)
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Downscale frames to at most this many pixels per side before decoding
    /// (0 = never)
    #[arg(long, default_value_t = QR_MAX_DIMENSION)]
    max_dimension: u32,

    /// List available cameras and exit
    #[arg(long)]
    list_cameras: bool,
}

impl From<Cli> for ScannerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            camera_index: cli.camera_index,
            beep: cli.beep,
            debug: cli.debug,
            preview: !cli.no_preview,
            max_dimension: cli.max_dimension,
            mappings: cli.mappings,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barcode_scanner=trace, RUST_LOG=info
    // --debug raises this crate to debug on top of RUST_LOG
    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if cli.debug
        && let Ok(directive) = "barcode_scanner=debug".parse()
    {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    if cli.list_cameras {
        print_cameras();
        return ExitCode::from(EXIT_OK);
    }

    let config = ScannerConfig::from(cli);
    match scanner::run(&config) {
        Ok(_) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!(error = %e, "Scanner stopped");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn print_cameras() {
    let cameras = list_cameras();
    if cameras.is_empty() {
        println!("No cameras found");
        return;
    }

    println!("Available cameras:");
    for camera in &cameras {
        println!("  [{}] {} ({})", camera.index, camera.name, camera.path);
    }
}
