use std::{thread, time::Duration};

use image::RgbaImage;

use crate::capture::{
    dependencies::DeviceBridge,
    file::CaptureStore,
    types::{Capture, CaptureError, CaptureStop, is_ready_state},
};

/// Limits for one capture loop.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub max_captures: usize,
    /// Pause after each scroll so the scrollbar can fade out.
    pub inter_capture_delay: Duration,
}

/// Ordered captures produced by one run of the loop.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub captures: Vec<Capture>,
    pub stop: CaptureStop,
}

/// Check that the bridge can reach a usable device before capturing anything.
pub fn preflight(bridge: &dyn DeviceBridge) -> Result<(), CaptureError> {
    let state = match bridge.state() {
        Ok(state) => state,
        Err(err) => return Err(describe_unavailable(bridge, err.to_string())),
    };

    if !is_ready_state(&state) {
        return Err(describe_unavailable(
            bridge,
            format!("device state is '{}'", state),
        ));
    }

    log::debug!("Device ready");
    Ok(())
}

fn describe_unavailable(bridge: &dyn DeviceBridge, reason: String) -> CaptureError {
    let listing = match bridge.devices() {
        Ok(devices) if devices.is_empty() => "no devices attached".to_string(),
        Ok(devices) => devices
            .iter()
            .map(|d| format!("{} ({})", d.serial, d.state))
            .collect::<Vec<_>>()
            .join(", "),
        Err(_) => "device list unavailable".to_string(),
    };
    CaptureError::DeviceUnavailable(format!(
        "{}. Is your device connected? Found: {}",
        reason, listing
    ))
}

/// Capture screens until the content stops scrolling or the limit is hit.
///
/// When `store` is given every accepted capture is written to disk as soon as it is
/// taken, so a failed run still leaves usable captures behind.
pub fn run_capture_loop(
    bridge: &dyn DeviceBridge,
    settings: &CaptureSettings,
    store: Option<&CaptureStore>,
) -> Result<CaptureSession, CaptureError> {
    if settings.max_captures == 0 {
        return Err(CaptureError::InvalidSettings(
            "max_captures must be at least 1".into(),
        ));
    }

    log::info!("Capturing image 0");
    let (image_data, image) = grab(bridge)?;
    let mut captures = vec![accept(0, image, &image_data, store)?];
    let mut stop = CaptureStop::LimitReached;

    while captures.len() < settings.max_captures {
        bridge.scroll()?;

        if !settings.inter_capture_delay.is_zero() {
            thread::sleep(settings.inter_capture_delay);
        }

        let index = captures.len();
        log::info!("Capturing image {}", index);
        let (image_data, image) = grab(bridge)?;

        if captures.last().is_some_and(|prev| prev.same_pixels(&image)) {
            log::info!("Screen unchanged after scrolling, reached the bottom");
            stop = CaptureStop::BottomReached;
            break;
        }

        captures.push(accept(index, image, &image_data, store)?);
    }

    if stop == CaptureStop::LimitReached {
        log::info!("Stopped after max_captures ({})", settings.max_captures);
    }

    Ok(CaptureSession { captures, stop })
}

/// Take one screenshot and decode it.
fn grab(bridge: &dyn DeviceBridge) -> Result<(Vec<u8>, RgbaImage), CaptureError> {
    let image_data = bridge.screenshot()?;
    if image_data.is_empty() {
        return Err(CaptureError::EmptyScreenshot);
    }
    log::debug!("Obtained screenshot data ({} bytes)", image_data.len());

    let image = image::load_from_memory(&image_data)?.to_rgba8();
    Ok((image_data, image))
}

fn accept(
    index: usize,
    image: RgbaImage,
    image_data: &[u8],
    store: Option<&CaptureStore>,
) -> Result<Capture, CaptureError> {
    let saved_path = match store {
        Some(store) => Some(store.save(index, image_data)?),
        None => None,
    };

    Ok(Capture {
        index,
        image,
        saved_path,
    })
}
