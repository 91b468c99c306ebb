// SPDX-License-Identifier: MPL-2.0

//! Error types for the barcode scanner

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Exit code for a clean shutdown
pub const EXIT_OK: u8 = 0;
/// Exit code for errors that have no dedicated code
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when the camera cannot be opened
pub const EXIT_CAMERA_UNAVAILABLE: u8 = 3;
/// Exit code when the camera stops delivering frames mid-run
pub const EXIT_CAPTURE_LOST: u8 = 4;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Terminal / console errors
    Display(DisplayError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// No device node for the requested index
    NotFound(usize),
    /// Device exists but could not be opened or configured
    OpenFailed { index: usize, reason: String },
    /// Device only offers formats we cannot convert
    UnsupportedFormat(String),
    /// Reading or converting a frame failed
    CaptureFailed(String),
    /// Camera disconnected during operation
    Disconnected,
}

/// Terminal / console errors
#[derive(Debug, Clone)]
pub enum DisplayError {
    /// Terminal could not be put into or out of raw / preview mode
    Terminal(String),
    /// Writing console output failed
    Output(String),
    /// Reading keyboard input failed
    Input(String),
}

/// Tone output errors
///
/// These never leave the scan loop; a failed beep is logged and dropped.
#[derive(Debug, Clone)]
pub enum AudioError {
    /// No default output device
    NoOutputDevice,
    /// Output device rejected the stream configuration
    StreamFailed(String),
    /// Fallback bell could not be written
    Bell(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Camera(e) if e.is_open_failure() => EXIT_CAMERA_UNAVAILABLE,
            AppError::Camera(_) => EXIT_CAPTURE_LOST,
            _ => EXIT_FAILURE,
        }
    }
}

impl CameraError {
    /// True for errors raised before the first frame could be read
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            CameraError::NotFound(_)
                | CameraError::OpenFailed { .. }
                | CameraError::UnsupportedFormat(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Display(e) => write!(f, "Display error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NotFound(index) => write!(f, "Camera {} not found", index),
            CameraError::OpenFailed { index, reason } => {
                write!(f, "Could not open camera {}: {}", index, reason)
            }
            CameraError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            CameraError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            CameraError::Disconnected => write!(f, "Camera disconnected"),
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Terminal(msg) => write!(f, "Terminal setup failed: {}", msg),
            DisplayError::Output(msg) => write!(f, "Console output failed: {}", msg),
            DisplayError::Input(msg) => write!(f, "Keyboard input failed: {}", msg),
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "No audio output device available"),
            AudioError::StreamFailed(msg) => write!(f, "Audio stream failed: {}", msg),
            AudioError::Bell(msg) => write!(f, "Terminal bell failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for DisplayError {}
impl std::error::Error for AudioError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<DisplayError> for AppError {
    fn from(err: DisplayError) -> Self {
        AppError::Display(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Output(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Display(err.into())
    }
}
