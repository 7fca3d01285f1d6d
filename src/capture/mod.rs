//! Screenshot capture for wearstitch.
//!
//! This module provides:
//! - The device boundary (`adb` by default, mockable in tests)
//! - The scroll-and-capture loop
//! - On-disk storage of intermediate captures

pub mod adb;
pub mod file;
pub mod types;

mod dependencies;
mod pipeline;

pub use dependencies::{DeviceBridge, default_bridge};
pub use file::CaptureStore;
pub use pipeline::{CaptureSession, CaptureSettings, preflight, run_capture_loop};
pub use types::{Capture, CaptureError, CaptureStop, DeviceInfo};
