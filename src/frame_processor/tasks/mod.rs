// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! This module contains the decoder abstraction and implementations for
//! the symbologies we can read. QR codes go through rqrr, everything else
//! (EAN/UPC, Code 128 and the other linear codes) through rxing.

pub mod barcode_detector;
pub mod qr_detector;

pub use barcode_detector::BarcodeDetector;
pub use qr_detector::QrDetector;

use crate::backends::camera::types::CameraFrame;
use crate::frame_processor::types::DecodedSymbol;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};

/// Finds and decodes symbols in a frame
///
/// An empty result means nothing was found; decoders do not fail.
pub trait SymbolDecoder {
    /// Decode every symbol in the frame, in detection order
    fn decode(&mut self, frame: &CameraFrame) -> Vec<DecodedSymbol>;
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for Box<T> {
    fn decode(&mut self, frame: &CameraFrame) -> Vec<DecodedSymbol> {
        (**self).decode(frame)
    }
}

/// Runs several decoders over the same frame
///
/// Results are concatenated in the order the decoders were added.
#[derive(Default)]
pub struct DecoderChain {
    decoders: Vec<Box<dyn SymbolDecoder>>,
}

impl DecoderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoder to the chain
    pub fn with(mut self, decoder: impl SymbolDecoder + 'static) -> Self {
        self.decoders.push(Box::new(decoder));
        self
    }

    /// QR through rqrr followed by linear barcodes through rxing
    pub fn standard(max_dimension: u32) -> Self {
        Self::new()
            .with(QrDetector::with_max_dimension(max_dimension))
            .with(BarcodeDetector::with_max_dimension(max_dimension))
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl SymbolDecoder for DecoderChain {
    fn decode(&mut self, frame: &CameraFrame) -> Vec<DecodedSymbol> {
        let mut symbols = Vec::new();
        for decoder in &mut self.decoders {
            symbols.extend(decoder.decode(frame));
        }
        symbols
    }
}

/// Factor the frame is shrunk by so its longest side fits `max_dimension`
pub fn downscale_factor(width: u32, height: u32, max_dimension: u32) -> f32 {
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return 1.0;
    }
    (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32)
}

/// Grayscale copy of the frame, downscaled when `scale > 1`
pub(crate) fn to_detection_gray(image: &RgbaImage, scale: f32) -> GrayImage {
    let gray = imageops::grayscale(image);
    if scale <= 1.0 {
        return gray;
    }

    let new_width = ((image.width() as f32 / scale) as u32).max(1);
    let new_height = ((image.height() as f32 / scale) as u32).max(1);
    imageops::resize(&gray, new_width, new_height, FilterType::Triangle)
}
