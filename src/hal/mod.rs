//! # Hardware Abstraction Module
//!
//! Interfaces to the collaborators the calibration core depends on but does
//! not implement.
//!
//! This module handles:
//! - Raw ADC sampling of the six analog channels
//! - LED-style presentation of the calibration phase
//! - Button identities and the discrete events delivered for them
//! - A monotonic time source for the internal sample gating

pub mod adc;
pub mod button;
pub mod clock;
pub mod led;

pub use adc::{AdcChannel, ChannelSnapshot, SampleSource, ADC_FULL_SCALE};
pub use button::{Button, ButtonEvent};
pub use clock::{Clock, MonotonicClock};
pub use led::{Indicator, LedStyle, LogIndicator};
