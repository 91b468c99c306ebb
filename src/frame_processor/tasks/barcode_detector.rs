// SPDX-License-Identifier: GPL-3.0-only

//! Linear and non-QR 2D barcode detection task
//!
//! Uses rxing's multi-format reader over the same downscaled luma image the
//! QR task builds. QR codes are left to the rqrr task.

use super::{SymbolDecoder, downscale_factor, to_detection_gray};
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection::{LINEAR_MIN_HALF_HEIGHT, QR_MAX_DIMENSION};
use crate::frame_processor::types::{DecodedSymbol, Point, Symbology};
use image::RgbaImage;
use rxing::BarcodeFormat;
use tracing::{debug, trace};

/// Barcode detector for EAN/UPC, Code 39/93/128, Codabar, ITF and friends
pub struct BarcodeDetector {
    /// Maximum dimension for processing (frames are downscaled to this, 0 = never)
    max_dimension: u32,
}

impl Default for BarcodeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BarcodeDetector {
    pub fn new() -> Self {
        Self {
            max_dimension: QR_MAX_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Detect barcodes in an RGBA image
    pub fn detect(&self, image: &RgbaImage) -> Vec<DecodedSymbol> {
        let start = std::time::Instant::now();

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let scale = downscale_factor(width, height, self.max_dimension);
        let gray = to_detection_gray(image, scale);
        let (proc_width, proc_height) = gray.dimensions();

        let results =
            match rxing::helpers::detect_multiple_in_luma(gray.into_raw(), proc_width, proc_height)
            {
                Ok(results) => results,
                Err(e) => {
                    // rxing reports "nothing found" as an error too
                    trace!(error = %e, "No barcodes in frame");
                    return Vec::new();
                }
            };

        let mut detections = Vec::with_capacity(results.len());
        for result in &results {
            let Some(symbology) = symbology_for(result.getBarcodeFormat()) else {
                continue;
            };

            let points: Vec<Point> = result
                .getPoints()
                .iter()
                .map(|p| Point::new(p.x * scale, p.y * scale))
                .collect();
            let Some(corners) = corners_from_points(&points) else {
                debug!(symbology = %symbology, "Barcode result without location");
                continue;
            };

            debug!(
                symbology = %symbology,
                content = %result.getText(),
                x = corners[0].x,
                y = corners[0].y,
                "Detected barcode"
            );
            detections.push(DecodedSymbol::new(symbology, result.getText(), corners));
        }

        trace!(
            count = detections.len(),
            total_ms = start.elapsed().as_millis(),
            "Barcode detection complete"
        );

        detections
    }
}

impl SymbolDecoder for BarcodeDetector {
    fn decode(&mut self, frame: &CameraFrame) -> Vec<DecodedSymbol> {
        self.detect(&frame.image)
    }
}

/// Map an rxing format to ours; QR and formats we do not report give `None`
fn symbology_for(format: &BarcodeFormat) -> Option<Symbology> {
    let symbology = match format {
        BarcodeFormat::AZTEC => Symbology::Aztec,
        BarcodeFormat::CODABAR => Symbology::Codabar,
        BarcodeFormat::CODE_39 => Symbology::Code39,
        BarcodeFormat::CODE_93 => Symbology::Code93,
        BarcodeFormat::CODE_128 => Symbology::Code128,
        BarcodeFormat::DATA_MATRIX => Symbology::DataMatrix,
        BarcodeFormat::EAN_8 => Symbology::Ean8,
        BarcodeFormat::EAN_13 => Symbology::Ean13,
        BarcodeFormat::ITF => Symbology::Itf,
        BarcodeFormat::PDF_417 => Symbology::Pdf417,
        BarcodeFormat::UPC_A => Symbology::UpcA,
        BarcodeFormat::UPC_E => Symbology::UpcE,
        _ => return None,
    };
    Some(symbology)
}

/// Four corners for a result
///
/// 2D symbols come with at least four points. Linear symbols only report
/// where the scan line crossed the start and stop patterns, so their box is
/// the span of those points grown vertically to a visible height.
fn corners_from_points(points: &[Point]) -> Option<[Point; 4]> {
    if points.len() >= 4 {
        return Some([points[0], points[1], points[2], points[3]]);
    }
    let first = points.first()?;

    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let half_height = ((max_x - min_x) * 0.15).max(LINEAR_MIN_HALF_HEIGHT);
    let mid_y = (min_y + max_y) / 2.0;
    let top = (mid_y - half_height).min(min_y).max(0.0);
    let bottom = (mid_y + half_height).max(max_y);

    Some([
        Point::new(min_x, top),
        Point::new(max_x, top),
        Point::new(max_x, bottom),
        Point::new(min_x, bottom),
    ])
}
