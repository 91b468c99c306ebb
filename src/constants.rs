// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Capture negotiation
pub mod capture {
    /// Number of mmap buffers queued with the driver
    pub const BUFFER_COUNT: u32 = 4;

    /// Requested capture size; the decoder downscales beyond VGA anyway
    pub const TARGET_WIDTH: u32 = 640;
    pub const TARGET_HEIGHT: u32 = 480;
}

/// Symbol detection and annotation
pub mod detection {
    /// Longest side of the luma image handed to the decoders (0 = never downscale)
    pub const QR_MAX_DIMENSION: u32 = 640;

    /// Smallest half height, in pixels, of the box drawn around a linear barcode
    pub const LINEAR_MIN_HALF_HEIGHT: f32 = 4.0;

    /// Line width of frame annotations, in pixels
    pub const ANNOTATION_THICKNESS: u32 = 2;
}

/// First-sighting tone
pub mod tone {
    use std::time::Duration;

    pub const FREQUENCY_HZ: f32 = 1000.0;
    pub const DURATION: Duration = Duration::from_millis(120);

    /// Peak amplitude, full scale is 1.0
    pub const AMPLITUDE: f32 = 0.2;

    /// Fade in/out length at each end of the burst
    pub const FADE: Duration = Duration::from_millis(5);

    /// Extra time the stream is kept open after the burst
    pub const TAIL: Duration = Duration::from_millis(30);
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// How long each iteration waits for a key press
    pub const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(16);

    /// Log loop statistics every N frames (at debug level)
    pub const STATS_LOG_INTERVAL: u64 = 100;
}

/// Terminal preview layout
pub mod preview {
    /// Rows of the inline viewport, including the status line
    pub const VIEWPORT_HEIGHT: u16 = 24;
}

/// Version shown by `--version`, from `git describe` when built from a checkout
pub const VERSION: &str = env!("GIT_VERSION");

/// Label mapping file picked up from the working directory when present
pub const DEFAULT_MAPPINGS_FILE: &str = "mappings.json";
