// SPDX-License-Identifier: MPL-2.0

//! Core types for frame processing results
//!
//! These types represent the output of symbol decoders and are consumed by
//! the scan loop, the annotation pass and the terminal preview.

use std::fmt;

/// Barcode / QR encoding standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    QrCode,
    MicroQr,
    DataMatrix,
    Aztec,
    Pdf417,
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    Code39,
    Code93,
    Code128,
    Codabar,
    Itf,
}

impl Symbology {
    /// Type token printed in front of decoded text (`QR_CODE: ...`)
    pub fn name(&self) -> &'static str {
        match self {
            Self::QrCode => "QR_CODE",
            Self::MicroQr => "MICRO_QR",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Aztec => "AZTEC",
            Self::Pdf417 => "PDF417",
            Self::Ean8 => "EAN8",
            Self::Ean13 => "EAN13",
            Self::UpcA => "UPCA",
            Self::UpcE => "UPCE",
            Self::Code39 => "CODE39",
            Self::Code93 => "CODE93",
            Self::Code128 => "CODE128",
            Self::Codabar => "CODABAR",
            Self::Itf => "I25",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions.
/// This allows easy transformation to terminal cells regardless of
/// the actual frame size.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a region from a pixel rectangle, clamped to the frame
    pub fn from_rect(rect: &PixelRect, frame_width: u32, frame_height: u32) -> Self {
        let fw = frame_width.max(1) as f32;
        let fh = frame_height.max(1) as f32;
        let x = (rect.x / fw).clamp(0.0, 1.0);
        let y = (rect.y / fh).clamp(0.0, 1.0);
        Self {
            x,
            y,
            width: (rect.width / fw).clamp(0.0, 1.0 - x),
            height: (rect.height / fh).clamp(0.0, 1.0 - y),
        }
    }
}

/// One symbol found in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    pub symbology: Symbology,
    /// Decoded payload text
    pub text: String,
    /// Corner points in frame pixels, in the order the decoder reports them
    pub corners: [Point; 4],
}

impl DecodedSymbol {
    pub fn new(symbology: Symbology, text: impl Into<String>, corners: [Point; 4]) -> Self {
        Self {
            symbology,
            text: text.into(),
            corners,
        }
    }

    /// Default console / overlay label, `<TYPE>: <text>`
    pub fn label(&self) -> String {
        format!("{}: {}", self.symbology, self.text)
    }

    /// Bounding box enclosing all four corners
    pub fn bounding_box(&self) -> PixelRect {
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for p in &self.corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        PixelRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

/// What the display draws for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOverlay {
    pub region: FrameRegion,
    pub label: String,
    /// First sighting in this run
    pub is_new: bool,
}
