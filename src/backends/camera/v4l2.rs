// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 webcam capture
//!
//! Opens `/dev/videoN` with the v4l crate, negotiates a small uncompressed
//! (or MJPEG) format and reads frames from a memory-mapped stream. The
//! stream and device are released when the camera is dropped.

use super::FrameSource;
use super::format_converters::to_rgba_image;
use super::types::{CameraDevice, CameraFormat, CameraFrame, PixelFormat};
use crate::constants::capture;
use crate::errors::CameraError;
use std::path::Path;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

/// errno for a device that went away (unplugged webcam)
const ENODEV: i32 = 19;

/// A webcam opened through V4L2
pub struct V4l2Camera {
    index: usize,
    name: String,
    format: CameraFormat,
    stride: u32,
    // Declared before `device` so the buffers are unmapped before the fd closes
    stream: MmapStream<'static>,
    _device: Device,
}

impl V4l2Camera {
    /// Open `/dev/video<index>` and start streaming
    pub fn open(index: usize) -> Result<Self, CameraError> {
        let path = format!("/dev/video{}", index);
        if !Path::new(&path).exists() {
            return Err(CameraError::NotFound(index));
        }

        let open_failed = |reason: String| CameraError::OpenFailed { index, reason };

        let device = Device::new(index).map_err(|e| open_failed(e.to_string()))?;
        let caps = device.query_caps().map_err(|e| open_failed(e.to_string()))?;
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            return Err(open_failed(format!(
                "{} ({}) is not a video capture device",
                path, caps.card
            )));
        }

        let (format, stride) = negotiate_format(&device, index)?;
        info!(
            device = %path,
            card = %caps.card,
            driver = %caps.driver,
            format = %format,
            "Opened camera"
        );

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, capture::BUFFER_COUNT)
            .map_err(|e| open_failed(format!("failed to start stream: {}", e)))?;

        Ok(Self {
            index,
            name: caps.card,
            format,
            stride,
            stream,
            _device: device,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &CameraFormat {
        &self.format
    }
}

impl FrameSource for V4l2Camera {
    fn read_frame(&mut self) -> Result<CameraFrame, CameraError> {
        let (buf, meta) = CaptureStream::next(&mut self.stream).map_err(|e| {
            if e.raw_os_error() == Some(ENODEV) {
                CameraError::Disconnected
            } else {
                CameraError::CaptureFailed(e.to_string())
            }
        })?;

        // Only the first `bytesused` bytes are valid (matters for MJPEG)
        let used = meta.bytesused as usize;
        let data = if used > 0 && used <= buf.len() {
            &buf[..used]
        } else {
            buf
        };

        let image = to_rgba_image(data, &self.format, self.stride)?;
        Ok(CameraFrame::new(image, meta.sequence))
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        debug!(index = self.index, "Releasing camera");
    }
}

/// Pick a capture format, preferring small YUYV, then MJPEG, then the
/// device's current format if we can convert it
fn negotiate_format(device: &Device, index: usize) -> Result<(CameraFormat, u32), CameraError> {
    let open_failed = |reason: String| CameraError::OpenFailed { index, reason };

    let offered: Vec<FourCC> = device
        .enum_formats()
        .map(|formats| formats.into_iter().map(|f| f.fourcc).collect())
        .unwrap_or_default();

    for preferred in PixelFormat::PREFERRED {
        let fourcc = FourCC::new(preferred.fourcc());
        if !offered.is_empty() && !offered.contains(&fourcc) {
            continue;
        }

        let mut requested = device
            .format()
            .map_err(|e| open_failed(format!("failed to query format: {}", e)))?;
        requested.width = capture::TARGET_WIDTH;
        requested.height = capture::TARGET_HEIGHT;
        requested.fourcc = fourcc;

        match device.set_format(&requested) {
            Ok(applied) => {
                if let Some(pixel_format) = PixelFormat::from_fourcc(&applied.fourcc.repr) {
                    return Ok((
                        CameraFormat {
                            width: applied.width,
                            height: applied.height,
                            pixel_format,
                        },
                        applied.stride,
                    ));
                }
                debug!(requested = %preferred, got = ?applied.fourcc, "Driver substituted an unsupported format");
            }
            Err(e) => {
                warn!(format = %preferred, error = %e, "Could not set format");
            }
        }
    }

    // Fall back to whatever the device is already configured for
    let current = device
        .format()
        .map_err(|e| open_failed(format!("failed to query format: {}", e)))?;
    let pixel_format = PixelFormat::from_fourcc(&current.fourcc.repr).ok_or_else(|| {
        CameraError::UnsupportedFormat(format!(
            "camera {} only offers {}",
            index,
            String::from_utf8_lossy(&current.fourcc.repr)
        ))
    })?;

    Ok((
        CameraFormat {
            width: current.width,
            height: current.height,
            pixel_format,
        },
        current.stride,
    ))
}

/// Enumerate video capture devices
pub fn list_cameras() -> Vec<CameraDevice> {
    let mut cameras: Vec<CameraDevice> = v4l::context::enum_devices()
        .into_iter()
        .filter(|node| {
            Device::new(node.index())
                .and_then(|dev| dev.query_caps())
                .map(|caps| caps.capabilities.contains(Flags::VIDEO_CAPTURE))
                .unwrap_or(false)
        })
        .map(|node| CameraDevice {
            index: node.index(),
            name: node.name().unwrap_or_else(|| "Unknown camera".to_string()),
            path: node.path().to_string_lossy().to_string(),
        })
        .collect();

    cameras.sort_by_key(|c| c.index);
    debug!(count = cameras.len(), "Enumerated cameras");
    cameras
}
