use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};

use wearstitch::capture::{self, CaptureSettings, DeviceBridge};
use wearstitch::config::{Config, DisplayShape};
use wearstitch::output::{self, OutputName};
use wearstitch::run::{self, RunRequest};
use wearstitch::stitch::StitchOptions;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WEARSTITCH_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "wearstitch")]
#[command(
    version = VERSION,
    about = "Take Wear screenshots using adb and stitch them together"
)]
struct Cli {
    /// The directory to output to
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: String,

    /// The file prefix to use. An auto-incrementing index is added so previous outputs
    /// are not overwritten [default: stitch]
    #[arg(long, value_name = "PREFIX", conflicts_with = "file_name")]
    file_prefix: Option<String>,

    /// The name of the output file. This file will be overwritten
    #[arg(long, value_name = "NAME")]
    file_name: Option<String>,

    /// Arguments for adb. Use quotes to keep arguments together, e.g. --adb-args "-s emulator-5554"
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    adb_args: Option<String>,

    /// Capture new images to stitch (default)
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "no_capture")]
    capture: bool,

    /// Do not capture new images, just stitch images captured earlier with --keep-captures
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "capture")]
    no_capture: bool,

    /// Frame the stitched image with round borders (default)
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "square")]
    round: bool,

    /// Frame the stitched image with square borders
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "round")]
    square: bool,

    /// Make the corners a round screen chops off transparent
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "no_transparency")]
    transparency: bool,

    /// Disable transparency (default)
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "transparency")]
    no_transparency: bool,

    /// How long to wait between captures, in ms, so the scrollbar can disappear [default: 1000]
    #[arg(long, value_name = "MS")]
    inter_capture_delay: Option<u64>,

    /// Keep the intermediate captured screens
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "no_keep_captures")]
    keep_captures: bool,

    /// Discard the intermediate captured screens (default)
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "keep_captures")]
    no_keep_captures: bool,

    /// The maximum number of screens to capture [default: 50]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=1000))]
    max_captures: Option<u32>,

    /// Read settings from this file instead of ~/.config/wearstitch/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// List the devices adb can see and exit
    #[arg(long, action = ArgAction::SetTrue)]
    list_devices: bool,
}

/// Resolve a `--flag` / `--no-flag` pair; `None` when neither was given.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Cli {
    /// Command-line values take precedence over the config file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(adb_args) = &self.adb_args {
            config.device.adb_args = adb_args.clone();
        }
        if let Some(delay) = self.inter_capture_delay {
            config.capture.inter_capture_delay_ms = delay;
        }
        if let Some(max) = self.max_captures {
            config.capture.max_captures = max as usize;
        }
        if let Some(keep) = flag_pair(self.keep_captures, self.no_keep_captures) {
            config.capture.keep_captures = keep;
        }
        if let Some(round) = flag_pair(self.round, self.square) {
            config.stitch.shape = if round {
                DisplayShape::Round
            } else {
                DisplayShape::Square
            };
        }
        if let Some(transparency) = flag_pair(self.transparency, self.no_transparency) {
            config.stitch.transparency = transparency;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Naming is validated before anything touches the device.
    let output_name = OutputName::from_args(cli.file_prefix.clone(), cli.file_name.clone())?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_to(&mut config);

    let bridge = capture::default_bridge(&config.device);

    if cli.list_devices {
        let devices = bridge.devices().context("Failed to list devices")?;
        if devices.is_empty() {
            println!("No devices attached");
        }
        for device in devices {
            println!("{}\t{}", device.serial, device.state);
        }
        return Ok(());
    }

    let request = RunRequest {
        out_dir: output::expand_tilde(&cli.out_dir),
        output_name,
        capture: flag_pair(cli.capture, cli.no_capture).unwrap_or(true),
        keep_captures: config.capture.keep_captures,
        capture_settings: CaptureSettings {
            max_captures: config.capture.max_captures,
            inter_capture_delay: Duration::from_millis(config.capture.inter_capture_delay_ms),
        },
        stitch: StitchOptions::from_config(&config.stitch),
    };
    log::debug!("Run request: {:?}", request);

    let outcome = run::run(&request, bridge.as_ref())?;

    log::info!(
        "Stitched {} captures into {}x{}",
        outcome.capture_count,
        outcome.width,
        outcome.height
    );
    println!("Wrote {}", outcome.output_path.display());

    Ok(())
}
