use std::process::{Command, Stdio};

use crate::capture::{
    dependencies::DeviceBridge,
    types::{CaptureError, DeviceInfo},
};
use crate::config::DeviceConfig;

/// Device bridge backed by the `adb` command-line tool.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
    args: Vec<String>,
    swipe: [u32; 4],
}

impl AdbBridge {
    pub fn new(program: impl Into<String>, adb_args: &str, swipe: [u32; 4]) -> Self {
        Self {
            program: program.into(),
            args: split_adb_args(adb_args),
            swipe,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.adb_path.clone(), &config.adb_args, config.swipe)
    }

    /// Full argument list for a subcommand, passthrough args first.
    fn command_args<'a>(&'a self, subcommand: &[&'a str]) -> Vec<&'a str> {
        self.args
            .iter()
            .map(String::as_str)
            .chain(subcommand.iter().copied())
            .collect()
    }

    /// Run `adb <args> <subcommand>` and return stdout, failing on a non-zero exit.
    fn run(&self, subcommand: &[&str]) -> Result<Vec<u8>, CaptureError> {
        let args = self.command_args(subcommand);
        log::debug!("Executing adb command: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                CaptureError::DeviceUnavailable(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::DeviceUnavailable(format!(
                "adb {} failed: {}",
                subcommand.join(" "),
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl DeviceBridge for AdbBridge {
    fn state(&self) -> Result<String, CaptureError> {
        let stdout = self.run(&["get-state"])?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    fn devices(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
        let stdout = self.run(&["devices"])?;
        Ok(parse_devices(&String::from_utf8_lossy(&stdout)))
    }

    fn screenshot(&self) -> Result<Vec<u8>, CaptureError> {
        self.run(&["exec-out", "screencap", "-p"])
    }

    fn scroll(&self) -> Result<(), CaptureError> {
        let [x1, y1, x2, y2] = self.swipe.map(|v| v.to_string());
        self.run(&[
            "shell",
            "input",
            "swipe",
            x1.as_str(),
            y1.as_str(),
            x2.as_str(),
            y2.as_str(),
        ])?;
        Ok(())
    }
}

/// Split the `--adb-args` passthrough string into separate arguments.
pub fn split_adb_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Parse the output of `adb devices` (with or without `-l`).
pub fn parse_devices(output: &str) -> Vec<DeviceInfo> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            Some(DeviceInfo {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}
