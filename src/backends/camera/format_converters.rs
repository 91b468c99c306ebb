// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for captured buffers
//!
//! Every buffer a device delivers is turned into an RGBA image here, so the
//! decoder, the annotation pass and the terminal preview only ever see one
//! layout.

use super::types::{CameraFormat, PixelFormat};
use crate::errors::CameraError;
use image::{ImageFormat, RgbaImage};

/// Convert a raw device buffer to an RGBA image
///
/// `stride` is the driver-reported bytes per line; zero means tightly packed.
pub fn to_rgba_image(
    data: &[u8],
    format: &CameraFormat,
    stride: u32,
) -> Result<RgbaImage, CameraError> {
    let width = format.width;
    let height = format.height;

    // MJPEG buffers carry their own dimensions
    let Some(bpp) = format.pixel_format.bytes_per_pixel() else {
        return decode_mjpeg(data);
    };

    let stride = if stride == 0 { width * bpp } else { stride };
    let needed = stride as usize * height.saturating_sub(1) as usize + (width * bpp) as usize;
    if data.len() < needed {
        return Err(CameraError::CaptureFailed(format!(
            "short {} buffer: got {} bytes, expected {}",
            format.pixel_format,
            data.len(),
            needed
        )));
    }

    let rgba = match format.pixel_format {
        PixelFormat::RGB24 => rgb24_to_rgba(data, width, height, stride),
        PixelFormat::Gray8 => gray8_to_rgba(data, width, height, stride),
        packed => yuv422_to_rgba(data, width, height, stride, packed),
    };

    RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        CameraError::CaptureFailed(format!("converted buffer does not match {}", format))
    })
}

/// Decode one Motion JPEG buffer
pub fn decode_mjpeg(data: &[u8]) -> Result<RgbaImage, CameraError> {
    image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .map(|img| img.to_rgba8())
        .map_err(|e| CameraError::CaptureFailed(format!("MJPEG decode failed: {}", e)))
}

/// Convert packed YUV 4:2:2 to RGBA
///
/// Each 4-byte group encodes 2 pixels; the byte order depends on `format`:
/// ```text
/// YUYV: Y0 U  Y1 V
/// YVYU: Y0 V  Y1 U
/// UYVY: U  Y0 V  Y1
/// VYUY: V  Y0 U  Y1
/// ```
pub fn yuv422_to_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
) -> Vec<u8> {
    let w = width as usize;
    let mut rgba = Vec::with_capacity(w * height as usize * 4);

    for row in 0..height as usize {
        let line = &data[row * stride as usize..];
        for pair in 0..w.div_ceil(2) {
            let base = pair * 4;
            let Some(chunk) = line.get(base..base + 4) else {
                break;
            };
            let (y0, y1, u, v) = match format {
                PixelFormat::YUYV => (chunk[0], chunk[2], chunk[1], chunk[3]),
                PixelFormat::YVYU => (chunk[0], chunk[2], chunk[3], chunk[1]),
                PixelFormat::UYVY => (chunk[1], chunk[3], chunk[0], chunk[2]),
                _ => (chunk[1], chunk[3], chunk[2], chunk[0]),
            };

            for (i, luma) in [y0, y1].into_iter().enumerate() {
                if pair * 2 + i >= w {
                    break;
                }
                let (r, g, b) = yuv_to_rgb(luma, u, v);
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
    }

    rgba
}

/// Convert RGB24 rows to RGBA
pub fn rgb24_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let w = width as usize;
    let mut rgba = Vec::with_capacity(w * height as usize * 4);

    for row in 0..height as usize {
        let start = row * stride as usize;
        for px in data[start..start + w * 3].chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
    }

    rgba
}

/// Convert 8-bit grayscale rows to RGBA
pub fn gray8_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let w = width as usize;
    let mut rgba = Vec::with_capacity(w * height as usize * 4);

    for row in 0..height as usize {
        let start = row * stride as usize;
        for &v in &data[start..start + w] {
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }

    rgba
}

/// Convert YUV (BT.601) to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}
