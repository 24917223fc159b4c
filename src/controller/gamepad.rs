//! # Gamepad Device Module
//!
//! This module handles gamepad detection and connection using the Linux
//! evdev interface, and turns the opened device into an async event stream.
//!
//! ## Controller Detection
//!
//! A device qualifies as a gamepad when it reports:
//! - Both sticks: ABS_X/ABS_Y (left) and ABS_Z/ABS_RZ (right)
//! - Two analog triggers: ABS_RX/ABS_RY
//! - The south face button (BTN_SOUTH)
//!
//! An explicit device path skips detection.

use evdev::{AbsoluteAxisType, Device, EventStream, Key};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CalError, Result};

/// Absolute axes a device must report to be used.
const REQUIRED_AXES: [AbsoluteAxisType; 6] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_Z,
    AbsoluteAxisType::ABS_RZ,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
];

/// Directory scanned for event nodes during detection.
const INPUT_DIR: &str = "/dev/input";

/// Gamepad handle.
///
/// Represents an open evdev gamepad device.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl Gamepad {
    /// Opens the gamepad at `device_path`, or the first detected gamepad when
    /// `None`.
    ///
    /// # Errors
    ///
    /// - `Controller`: The given device cannot be opened or is not a gamepad,
    ///   or `/dev/input` cannot be read
    /// - `ControllerNotFound`: Detection found no gamepad
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stick_cal::controller::gamepad::Gamepad;
    ///
    /// let gamepad = Gamepad::open(None)?;
    /// println!("Connected to gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device_path: Option<&str>) -> Result<Self> {
        match device_path {
            Some(path) => Self::open_path(Path::new(path)),
            None => Self::discover(),
        }
    }

    fn open_path(path: &Path) -> Result<Self> {
        let device = Device::open(path).map_err(|e| {
            CalError::Controller(format!("Failed to open {}: {}", path.display(), e))
        })?;

        if !is_gamepad(&device) {
            return Err(CalError::Controller(format!(
                "{} does not report both sticks and both triggers",
                path.display()
            )));
        }

        let device_path = path.to_string_lossy().to_string();
        info!("Using gamepad at: {}", device_path);
        Ok(Self {
            device,
            device_path,
        })
    }

    fn discover() -> Result<Self> {
        let input_dir = Path::new(INPUT_DIR);

        if !input_dir.exists() {
            return Err(CalError::Controller(format!(
                "{} directory not found",
                INPUT_DIR
            )));
        }

        let mut paths: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| CalError::Controller(format!("Failed to read {}: {}", INPUT_DIR, e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_event_node(path))
            .collect();

        // Deterministic choice when several gamepads are connected
        paths.sort();

        for path in paths {
            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if is_gamepad(&device) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found gamepad at: {}", device_path);
                        return Ok(Self {
                            device,
                            device_path,
                        });
                    }
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(CalError::ControllerNotFound)
    }

    /// Returns the `/dev/input/eventX` path this gamepad was opened from.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name reported by the driver.
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Converts the device into an async stream of input events.
    ///
    /// # Errors
    ///
    /// Returns `Controller` if the device cannot be switched to non-blocking
    /// mode.
    pub fn into_event_stream(self) -> Result<EventStream> {
        self.device
            .into_event_stream()
            .map_err(|e| CalError::Controller(format!("Failed to create event stream: {}", e)))
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with("event"))
        .unwrap_or(false)
}

fn is_gamepad(device: &Device) -> bool {
    let has_axes = device
        .supported_absolute_axes()
        .map(|axes| REQUIRED_AXES.iter().all(|&axis| axes.contains(axis)))
        .unwrap_or(false);
    let has_buttons = device
        .supported_keys()
        .map(|keys| keys.contains(Key::BTN_SOUTH))
        .unwrap_or(false);

    has_axes && has_buttons
}
