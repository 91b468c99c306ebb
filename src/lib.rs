// SPDX-License-Identifier: MPL-2.0

//! Barcode Scanner - webcam QR / barcode scanning in the terminal
//!
//! Reads frames from a V4L2 webcam, decodes symbols in each frame, prints
//! every value the first time it is seen and optionally beeps.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`scanner`]: The capture/decode/report loop and its deduplication state
//! - [`backends`]: Camera capture and beep output
//! - [`frame_processor`]: Symbol decoding and frame annotation
//! - [`terminal`]: Half-block preview surface
//! - [`console`]: Plain line-oriented surface
//! - [`config`]: Run configuration and label mappings
//!
//! # Example
//!
//! ```ignore
//! // Scan with camera 0, no beep:
//! // barcode-scanner 0 0
//! ```

pub mod backends;
pub mod config;
pub mod console;
pub mod constants;
pub mod errors;
pub mod frame_processor;
pub mod scanner;
pub mod terminal;

// Re-export commonly used types
pub use config::{LabelMappings, ScannerConfig};
pub use errors::{AppError, AppResult};
pub use frame_processor::{DecodedSymbol, Symbology};
pub use scanner::{LoopStats, ScanSession, scan_loop};
