//! Configuration file support for wearstitch.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/wearstitch/config.toml`. Settings include how `adb` is invoked,
//! capture loop limits, and stitching/framing preferences.
//!
//! If no config file exists, sensible defaults are used automatically. Command-line
//! flags always take precedence over values loaded here.

pub mod enums;
pub mod types;

pub use enums::{ColorSpec, DisplayShape};
pub use types::{CaptureConfig, DeviceConfig, StitchConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [device]
/// adb_args = "-s emulator-5554"
/// swipe = [50, 200, 50, 100]
///
/// [capture]
/// inter_capture_delay_ms = 800
/// max_captures = 30
///
/// [stitch]
/// shape = "round"
/// transparency = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// How the device bridge is invoked
    #[serde(default)]
    pub device: DeviceConfig,

    /// Capture loop limits
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Overlap detection and framing
    #[serde(default)]
    pub stitch: StitchConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Validated ranges:
    /// - `inter_capture_delay_ms`: 0 - 60000
    /// - `max_captures`: 1 - 1000
    /// - `match_threshold`: 0.5 - 1.0
    /// - `min_overlap_rows`: 1 - 512
    fn validate_and_clamp(&mut self) {
        if self.capture.inter_capture_delay_ms > 60_000 {
            log::warn!(
                "Invalid inter_capture_delay_ms {}, clamping to 0-60000 range",
                self.capture.inter_capture_delay_ms
            );
            self.capture.inter_capture_delay_ms = 60_000;
        }

        if !(1..=1000).contains(&self.capture.max_captures) {
            log::warn!(
                "Invalid max_captures {}, clamping to 1-1000 range",
                self.capture.max_captures
            );
            self.capture.max_captures = self.capture.max_captures.clamp(1, 1000);
        }

        if !(0.5..=1.0).contains(&self.stitch.match_threshold) {
            log::warn!(
                "Invalid match_threshold {:.2}, clamping to 0.5-1.0 range",
                self.stitch.match_threshold
            );
            // NaN would survive clamp()
            self.stitch.match_threshold = if self.stitch.match_threshold.is_nan() {
                1.0
            } else {
                self.stitch.match_threshold.clamp(0.5, 1.0)
            };
        }

        if !(1..=512).contains(&self.stitch.min_overlap_rows) {
            log::warn!(
                "Invalid min_overlap_rows {}, clamping to 1-512 range",
                self.stitch.min_overlap_rows
            );
            self.stitch.min_overlap_rows = self.stitch.min_overlap_rows.clamp(1, 512);
        }

        if self.device.adb_path.trim().is_empty() {
            log::warn!("Empty adb_path, falling back to 'adb'");
            self.device.adb_path = "adb".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/wearstitch/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("wearstitch");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path. Unlike [`Config::load`], a missing
    /// file is an error.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema describing the config file, used by `dump_config_schema`.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
