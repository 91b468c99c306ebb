// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │     Scan loop       │
//! └──────────┬──────────┘
//!            │ read_frame()
//!            ▼
//! ┌─────────────────────┐
//! │ FrameSource trait   │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │  V4L2  │  ← Concrete implementation
//!       └────────┘
//! ```

pub mod format_converters;
pub mod types;
pub mod v4l2;

pub use types::*;
pub use v4l2::{V4l2Camera, list_cameras};

use crate::errors::CameraError;

/// Anything that can hand the scan loop one RGBA frame at a time
///
/// Implementations release their device when dropped.
pub trait FrameSource {
    /// Block until the next frame is available
    ///
    /// An error ends the scan; there is no reconnect.
    fn read_frame(&mut self) -> Result<CameraFrame, CameraError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> Result<CameraFrame, CameraError> {
        (**self).read_frame()
    }
}
