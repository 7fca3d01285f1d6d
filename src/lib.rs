//! Library exports for wearstitch.
//!
//! Captures a scrolling sequence of screenshots from a Wear OS device over adb
//! and stitches them into one tall image. The binary is a thin CLI over
//! [`run::run`]; the stages are exposed separately so captures already on disk
//! can be stitched without a device.

pub mod capture;
pub mod config;
pub mod output;
pub mod run;
pub mod stitch;

pub use config::Config;
