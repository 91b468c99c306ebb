// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use image::RgbaImage;

/// Represents a camera device found during enumeration
#[derive(Debug, Clone)]
pub struct CameraDevice {
    /// Capture index (the `N` in `/dev/videoN`)
    pub index: usize,
    pub name: String,
    pub path: String,
}

/// Capture format negotiated with the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
    }
}

/// Pixel layout of the raw buffers a device delivers
///
/// Every format is converted to RGBA on the CPU before it reaches the
/// scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    /// Common raw format from webcam sensors
    YUYV,
    /// YVYU - Packed 4:2:2 (Y0 V Y1 U interleaved)
    YVYU,
    /// UYVY - Packed 4:2:2 (U Y0 V Y1 interleaved)
    UYVY,
    /// VYUY - Packed 4:2:2 (V Y0 U Y1 interleaved)
    VYUY,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// Motion JPEG - every buffer is a complete JPEG image
    MJPEG,
}

impl PixelFormat {
    /// Formats in the order they are requested from a device
    pub const PREFERRED: [PixelFormat; 2] = [PixelFormat::YUYV, PixelFormat::MJPEG];

    /// Map a V4L2 FourCC code to a supported format
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"YUYV" => Some(Self::YUYV),
            b"YVYU" => Some(Self::YVYU),
            b"UYVY" => Some(Self::UYVY),
            b"VYUY" => Some(Self::VYUY),
            b"RGB3" => Some(Self::RGB24),
            b"GREY" => Some(Self::Gray8),
            b"MJPG" => Some(Self::MJPEG),
            _ => None,
        }
    }

    /// The V4L2 FourCC code for this format
    pub fn fourcc(&self) -> &'static [u8; 4] {
        match self {
            Self::YUYV => b"YUYV",
            Self::YVYU => b"YVYU",
            Self::UYVY => b"UYVY",
            Self::VYUY => b"VYUY",
            Self::RGB24 => b"RGB3",
            Self::Gray8 => b"GREY",
            Self::MJPEG => b"MJPG",
        }
    }

    /// Bytes per pixel for uncompressed formats, `None` for MJPEG
    pub fn bytes_per_pixel(&self) -> Option<u32> {
        match self {
            Self::YUYV | Self::YVYU | Self::UYVY | Self::VYUY => Some(2),
            Self::RGB24 => Some(3),
            Self::Gray8 => Some(1),
            Self::MJPEG => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.fourcc()))
    }
}

/// A single frame converted to RGBA
///
/// The scan loop owns each frame for one iteration; decoders read it and the
/// annotation pass draws into it before it is handed to the display.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub image: RgbaImage,
    /// Driver sequence number (monotonic per stream)
    pub sequence: u32,
}

impl CameraFrame {
    pub fn new(image: RgbaImage, sequence: u32) -> Self {
        Self {
            image,
            sequence,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourcc_roundtrips_for_supported_formats() {
        for format in [
            PixelFormat::YUYV,
            PixelFormat::YVYU,
            PixelFormat::UYVY,
            PixelFormat::VYUY,
            PixelFormat::RGB24,
            PixelFormat::Gray8,
            PixelFormat::MJPEG,
        ] {
            assert_eq!(PixelFormat::from_fourcc(format.fourcc()), Some(format));
        }
    }

    #[test]
    fn unknown_fourcc_is_rejected() {
        assert_eq!(PixelFormat::from_fourcc(b"H264"), None);
        assert_eq!(PixelFormat::from_fourcc(b"NV12"), None);
    }

    #[test]
    fn format_display_uses_fourcc() {
        let format = CameraFormat {
            width: 640,
            height: 480,
            pixel_format: PixelFormat::YUYV,
        };
        assert_eq!(format.to_string(), "640x480 YUYV");
    }
}
