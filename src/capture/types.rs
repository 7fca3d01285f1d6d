//! Data types for the capture loop.

use image::RgbaImage;
use std::path::PathBuf;
use thiserror::Error;

/// One decoded screenshot, tagged with its position in the session.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Zero-based sequence index.
    pub index: usize,
    /// Decoded pixels.
    pub image: RgbaImage,
    /// Where the capture was persisted, if it was.
    pub saved_path: Option<PathBuf>,
}

impl Capture {
    /// Pixel-identical comparison, used to detect that scrolling made no progress.
    pub fn same_pixels(&self, other: &RgbaImage) -> bool {
        self.image.dimensions() == other.dimensions() && self.image.as_raw() == other.as_raw()
    }
}

/// A device as listed by `adb devices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub serial: String,
    /// Connection state reported by adb (`device`, `offline`, `unauthorized`, ...).
    pub state: String,
}

impl DeviceInfo {
    pub fn is_ready(&self) -> bool {
        is_ready_state(&self.state)
    }
}

/// Whether an adb connection state means the device accepts commands.
pub fn is_ready_state(state: &str) -> bool {
    state == "device"
}

/// Why the capture loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStop {
    /// Two consecutive screenshots were identical.
    BottomReached,
    /// `max_captures` screenshots were taken.
    LimitReached,
}

/// Errors that can occur while talking to the device or collecting captures.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Device returned an empty screenshot")]
    EmptyScreenshot,

    #[error("Failed to decode screenshot: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Failed to save capture: {0}")]
    SaveError(#[from] std::io::Error),

    #[error("Invalid capture settings: {0}")]
    InvalidSettings(String),
}
