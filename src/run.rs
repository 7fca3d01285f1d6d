//! One end-to-end run: name the output, collect captures, stitch, write.

use std::path::PathBuf;

use thiserror::Error;

use crate::capture::{self, CaptureError, CaptureSettings, CaptureStop, DeviceBridge};
use crate::output::{self, OutputError, OutputName};
use crate::stitch::{self, StitchError, StitchOptions};

/// Everything a run needs besides the device.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub out_dir: PathBuf,
    pub output_name: OutputName,
    /// Capture new screens; when false, stitch captures already on disk.
    pub capture: bool,
    pub keep_captures: bool,
    pub capture_settings: CaptureSettings,
    pub stitch: StitchOptions,
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub capture_count: usize,
    pub overlaps: Vec<u32>,
    pub width: u32,
    pub height: u32,
    /// Why capturing stopped; `None` in no-capture mode.
    pub stop: Option<CaptureStop>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Run the capture loop (or load existing captures), stitch, and write the result.
///
/// Capture failures abort before stitching, and stitch failures abort before
/// anything is written.
pub fn run(request: &RunRequest, bridge: &dyn DeviceBridge) -> Result<RunOutcome, RunError> {
    let layout = output::plan_layout(
        &request.out_dir,
        &request.output_name,
        request.capture,
        request.capture_settings.max_captures,
    )?;
    log::debug!("Output layout: {:?}", layout);

    let (captures, stop) = if request.capture {
        let stale = layout.captures.remove_all()?;
        if stale > 0 {
            log::info!("Removed {} stale captures", stale);
        }

        capture::preflight(bridge)?;
        let store = request.keep_captures.then_some(&layout.captures);
        let session = capture::run_capture_loop(bridge, &request.capture_settings, store)?;
        (session.captures, Some(session.stop))
    } else {
        (layout.captures.load_all()?, None)
    };

    let capture_count = captures.len();
    let images: Vec<_> = captures.into_iter().map(|capture| capture.image).collect();
    let result = stitch::stitch(&images, &request.stitch)?;

    output::save_image(&result.image, &layout.output_path)?;

    if !request.keep_captures {
        match layout.captures.remove_all() {
            Ok(0) => {}
            Ok(removed) => log::info!("Removed {} captures", removed),
            Err(e) => log::warn!("Failed to clean up captures: {}", e),
        }
    }

    Ok(RunOutcome {
        output_path: layout.output_path,
        capture_count,
        overlaps: result.overlaps,
        width: result.image.width(),
        height: result.image.height(),
        stop,
    })
}
