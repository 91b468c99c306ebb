// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture and audio output
//!
//! # Modules
//!
//! - [`audio`]: First-sighting beep (cpal tone or terminal bell)
//! - [`camera`]: V4L2 device enumeration and frame capture

pub mod audio;
pub mod camera;
