//! # Stick Cal Library
//!
//! Analog stick and hall-effect trigger calibration for game-controller firmware.
//!
//! This library turns raw 12-bit ADC readings from two joysticks and two
//! hall-effect triggers into normalized, dead-zone corrected output values,
//! and persists the calibration parameters to a single flash page.

pub mod calibration;
pub mod config;
pub mod controller;
pub mod error;
pub mod hal;
pub mod storage;
