use crate::capture::{
    adb::AdbBridge,
    types::{CaptureError, DeviceInfo},
};
use crate::config::DeviceConfig;

/// Abstraction over the device the screenshots come from. The default
/// implementation shells out to `adb`; tests substitute a scripted device.
pub trait DeviceBridge: Send + Sync {
    /// Connection state of the target device (`device` when usable).
    fn state(&self) -> Result<String, CaptureError>;

    /// Devices visible to the bridge.
    fn devices(&self) -> Result<Vec<DeviceInfo>, CaptureError>;

    /// Grab the current screen as encoded PNG bytes.
    fn screenshot(&self) -> Result<Vec<u8>, CaptureError>;

    /// Inject a scroll-down gesture.
    fn scroll(&self) -> Result<(), CaptureError>;
}

/// Build the production bridge from configuration.
pub fn default_bridge(config: &DeviceConfig) -> Box<dyn DeviceBridge> {
    Box::new(AdbBridge::from_config(config))
}
