// SPDX-License-Identifier: MPL-2.0

//! Frame processor module
//!
//! Symbol decoding over camera frames, the result types it produces, and
//! the annotation pass that draws results back into the frame.

pub mod annotate;
pub mod tasks;
pub mod types;

pub use annotate::annotate_frame;
pub use tasks::{BarcodeDetector, DecoderChain, QrDetector, SymbolDecoder};
pub use types::{DecodedSymbol, FrameRegion, PixelRect, Point, SymbolOverlay, Symbology};
