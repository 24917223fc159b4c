//! # Controller Module
//!
//! Host-side gamepad input for the calibration core.
//!
//! This module handles:
//! - Gamepad detection and connection via evdev
//! - Mapping stick and hall-trigger axes to 12-bit channel samples
//! - Turning button edges into click and long-press events

pub mod buttons;
pub mod gamepad;
pub mod mapper;

pub use buttons::ButtonTracker;
pub use gamepad::Gamepad;
pub use mapper::EventMapper;
