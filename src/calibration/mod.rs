//! # Calibration Module
//!
//! Stick and trigger calibration: data model, persistence, the
//! center/extent collection state machine and the stick correction transform.
//!
//! This module handles:
//! - Persisted parameters protected by a CRC-32 checksum
//! - Finding stick centers and trigger rest points from a settled sample window
//! - Recording the maximum stick travel in 60 angular sectors
//! - Normalizing, dead-zoning and scaling stick vectors for the output report
//!
//! ## Usage
//!
//! ```
//! use stick_cal::calibration::{Calibrator, ParameterStore, Side, Tuning, Vector2};
//! use stick_cal::hal::{LogIndicator, MonotonicClock};
//! use stick_cal::storage::RamFlash;
//!
//! let store = ParameterStore::load(RamFlash::default());
//! let calibrator = Calibrator::new(store, LogIndicator::new(), MonotonicClock, Tuning::default());
//!
//! // Default parameters: center 2048, radius 2048 in every sector
//! let out = calibrator.correct(Side::Left, Vector2::new(2048.0, 2048.0 + 1024.0));
//! assert_eq!(out.x, 0.0);
//! assert!((out.y - 16500.0).abs() < 1.0);
//! ```

pub mod crc;
pub mod machine;
pub mod params;
pub mod stick;
pub mod store;
pub mod window;

pub use machine::{CalibrationStatus, Calibrator};
pub use params::CalibrationParameters;
pub use stick::{correct_stick, trigger_travel, Vector2};
pub use store::ParameterStore;
pub use window::SampleWindow;

use std::time::Duration;

/// Number of angular sectors per stick radius table.
pub const SECTOR_COUNT: usize = 60;

/// Number of snapshots the center window must hold before it is evaluated.
pub const WINDOW_LEN: usize = 20;

/// Time between center-finding snapshots.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Largest per-channel spread (exclusive) for the window to count as settled.
pub const STABLE_SPREAD: u16 = 50;

/// Squared distance from center a sample must exceed to be binned.
pub const NOISE_FLOOR_SQ: f32 = 90_000.0;

/// Maximum distance, in sectors, from a sector center for a sample to be binned.
pub const SECTOR_TOLERANCE: f32 = 0.1;

/// Minimum trigger travel (max - min) for the triggers to count as found.
pub const TRIGGER_TRAVEL_MIN: u16 = 500;

/// Squared normalized magnitude below which output is forced to zero.
pub const DEAD_ZONE_SQ: f32 = 0.007;

/// Scale from normalized stick units to report units.
pub const OUTPUT_GAIN: f32 = 33_000.0;

/// Per-axis limit of the signed 16-bit output report.
pub const OUTPUT_LIMIT: f32 = 32_767.0;

/// Which stick or trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// Empirically tuned thresholds used by collection and correction.
///
/// Defaults are the values tuned on the reference hardware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub sample_interval: Duration,
    pub stable_spread: u16,
    pub noise_floor_sq: f32,
    pub sector_tolerance: f32,
    pub trigger_travel_min: u16,
    pub dead_zone_sq: f32,
    pub output_gain: f32,
    pub output_limit: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sample_interval: SAMPLE_INTERVAL,
            stable_spread: STABLE_SPREAD,
            noise_floor_sq: NOISE_FLOOR_SQ,
            sector_tolerance: SECTOR_TOLERANCE,
            trigger_travel_min: TRIGGER_TRAVEL_MIN,
            dead_zone_sq: DEAD_ZONE_SQ,
            output_gain: OUTPUT_GAIN,
            output_limit: OUTPUT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_matches_reference_constants() {
        let tuning = Tuning::default();
        assert_eq!(tuning.sample_interval, Duration::from_millis(100));
        assert_eq!(tuning.stable_spread, 50);
        assert_eq!(tuning.noise_floor_sq, 90_000.0);
        assert_eq!(tuning.sector_tolerance, 0.1);
        assert_eq!(tuning.trigger_travel_min, 500);
        assert_eq!(tuning.dead_zone_sq, 0.007);
        assert_eq!(tuning.output_gain, 33_000.0);
        assert_eq!(tuning.output_limit, 32_767.0);
    }

    #[test]
    fn test_noise_floor_is_about_300_raw_units() {
        assert!((NOISE_FLOOR_SQ.sqrt() - 300.0).abs() < 0.001);
    }
}
