// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate.
//! It converts camera frames to grayscale and searches for QR codes,
//! returning their corner points and decoded content.

use super::{SymbolDecoder, downscale_factor, to_detection_gray};
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection::QR_MAX_DIMENSION;
use crate::frame_processor::types::{DecodedSymbol, Point, Symbology};
use image::RgbaImage;
use tracing::{debug, trace};

/// QR code detector
///
/// Analyzes camera frames to detect and decode QR codes.
/// Optimized for real-time processing with frame downscaling.
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this, 0 = never)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self {
            max_dimension: QR_MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Detect QR codes in an RGBA image
    pub fn detect(&self, image: &RgbaImage) -> Vec<DecodedSymbol> {
        detect_sync(image, self.max_dimension)
    }
}

impl SymbolDecoder for QrDetector {
    fn decode(&mut self, frame: &CameraFrame) -> Vec<DecodedSymbol> {
        self.detect(&frame.image)
    }
}

fn detect_sync(image: &RgbaImage, max_dimension: u32) -> Vec<DecodedSymbol> {
    let start = std::time::Instant::now();

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let scale = downscale_factor(width, height, max_dimension);
    let gray = to_detection_gray(image, scale);

    trace!(
        proc_width = gray.width(),
        proc_height = gray.height(),
        scale,
        conversion_ms = start.elapsed().as_millis(),
        "Prepared grayscale image for processing"
    );

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| gray.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();

    trace!(
        count = grids.len(),
        detection_ms = start.elapsed().as_millis(),
        "QR grid detection complete"
    );

    let mut detections = Vec::with_capacity(grids.len());

    for grid in grids {
        let content = match grid.decode() {
            Ok((_meta, content)) => content,
            Err(e) => {
                debug!(error = %e, "Failed to decode QR code");
                continue;
            }
        };

        // Scale back to original frame coordinates
        let corners = grid
            .bounds
            .map(|p| Point::new(p.x as f32 * scale, p.y as f32 * scale));

        debug!(
            content = %content,
            x = corners[0].x,
            y = corners[0].y,
            "Detected QR code"
        );

        detections.push(DecodedSymbol::new(Symbology::QrCode, content, corners));
    }

    if !detections.is_empty() {
        debug!(
            count = detections.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found codes"
        );
    }

    detections
}
