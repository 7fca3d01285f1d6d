//! Configuration type definitions.

use super::enums::{ColorSpec, DisplayShape};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Device bridge settings.
///
/// Controls how `adb` is located and invoked.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeviceConfig {
    /// Path to the adb executable (looked up on PATH when not absolute)
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Extra arguments placed before every adb subcommand, e.g. "-s emulator-5554" or "-e"
    #[serde(default)]
    pub adb_args: String,

    /// Scroll gesture as [x1, y1, x2, y2] passed to `input swipe`
    #[serde(default = "default_swipe")]
    pub swipe: [u32; 4],
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            adb_args: String::new(),
            swipe: default_swipe(),
        }
    }
}

/// Capture loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// Delay between scrolling and the next screenshot in milliseconds (valid range: 0 - 60000)
    /// Gives the scrollbar time to fade out
    #[serde(default = "default_inter_capture_delay_ms")]
    pub inter_capture_delay_ms: u64,

    /// Maximum number of screens to capture (valid range: 1 - 1000)
    #[serde(default = "default_max_captures")]
    pub max_captures: usize,

    /// Keep the intermediate capture files next to the output
    #[serde(default)]
    pub keep_captures: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            inter_capture_delay_ms: default_inter_capture_delay_ms(),
            max_captures: default_max_captures(),
            keep_captures: false,
        }
    }
}

/// Stitching and framing settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StitchConfig {
    /// Display shape (round, square)
    #[serde(default = "default_shape")]
    pub shape: DisplayShape,

    /// Make the corners a round screen cuts off transparent instead of border-colored
    #[serde(default)]
    pub transparency: bool,

    /// Color used for the cut-off corners when transparency is disabled
    #[serde(default = "default_border_color")]
    pub border_color: ColorSpec,

    /// Fraction of rows that must match for an overlap to be accepted (valid range: 0.5 - 1.0)
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Smallest overlap in rows considered a real match (valid range: 1 - 512)
    #[serde(default = "default_min_overlap_rows")]
    pub min_overlap_rows: u32,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            shape: default_shape(),
            transparency: false,
            border_color: default_border_color(),
            match_threshold: default_match_threshold(),
            min_overlap_rows: default_min_overlap_rows(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_swipe() -> [u32; 4] {
    [50, 200, 50, 100]
}

fn default_inter_capture_delay_ms() -> u64 {
    1000
}

fn default_max_captures() -> usize {
    50
}

fn default_shape() -> DisplayShape {
    DisplayShape::Round
}

fn default_border_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_match_threshold() -> f64 {
    0.95
}

fn default_min_overlap_rows() -> u32 {
    8
}
