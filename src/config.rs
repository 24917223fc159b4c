//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; missing values take the
//! defaults below.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::calibration::params::RECORD_LEN;
use crate::calibration::{
    Tuning, DEAD_ZONE_SQ, NOISE_FLOOR_SQ, OUTPUT_GAIN, OUTPUT_LIMIT, SAMPLE_INTERVAL,
    SECTOR_TOLERANCE, STABLE_SPREAD, TRIGGER_TRAVEL_MIN,
};
use crate::error::{CalError, Result};
use crate::hal::ADC_FULL_SCALE;
use crate::storage::DEFAULT_PAGE_SIZE;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Flash page image configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_image_path")]
    pub image_path: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Empty selects the first detected gamepad.
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_axis_max")]
    pub axis_max: i32,

    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
}

/// Calibration thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationConfig {
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    #[serde(default = "default_stable_spread")]
    pub stable_spread: u16,

    #[serde(default = "default_noise_floor_sq")]
    pub noise_floor_sq: f32,

    #[serde(default = "default_sector_tolerance")]
    pub sector_tolerance: f32,

    #[serde(default = "default_trigger_travel_min")]
    pub trigger_travel_min: u16,

    #[serde(default = "default_dead_zone_sq")]
    pub dead_zone_sq: f32,

    #[serde(default = "default_output_gain")]
    pub output_gain: f32,

    #[serde(default = "default_output_limit")]
    pub output_limit: f32,
}

/// Scheduler configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Zero disables the periodic output report.
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty disables the rolling log file.
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_image_path() -> String { "./data/calibration.bin".to_string() }
fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

fn default_axis_max() -> i32 { 255 }
fn default_long_press_ms() -> u64 { 1000 }

fn default_sample_interval_ms() -> u64 { SAMPLE_INTERVAL.as_millis() as u64 }
fn default_stable_spread() -> u16 { STABLE_SPREAD }
fn default_noise_floor_sq() -> f32 { NOISE_FLOOR_SQ }
fn default_sector_tolerance() -> f32 { SECTOR_TOLERANCE }
fn default_trigger_travel_min() -> u16 { TRIGGER_TRAVEL_MIN }
fn default_dead_zone_sq() -> f32 { DEAD_ZONE_SQ }
fn default_output_gain() -> f32 { OUTPUT_GAIN }
fn default_output_limit() -> f32 { OUTPUT_LIMIT }

fn default_poll_interval_ms() -> u64 { 10 }
fn default_report_interval_ms() -> u64 { 1000 }

fn default_log_level() -> String { "info".to_string() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            page_size: default_page_size(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            axis_max: default_axis_max(),
            long_press_ms: default_long_press_ms(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            stable_spread: default_stable_spread(),
            noise_floor_sq: default_noise_floor_sq(),
            sector_tolerance: default_sector_tolerance(),
            trigger_travel_min: default_trigger_travel_min(),
            dead_zone_sq: default_dead_zone_sq(),
            output_gain: default_output_gain(),
            output_limit: default_output_limit(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl CalibrationConfig {
    /// Thresholds in the form the calibrator consumes.
    #[must_use]
    pub fn tuning(&self) -> Tuning {
        Tuning {
            sample_interval: Duration::from_millis(self.sample_interval_ms),
            stable_spread: self.stable_spread,
            noise_floor_sq: self.noise_floor_sq,
            sector_tolerance: self.sector_tolerance,
            trigger_travel_min: self.trigger_travel_min,
            dead_zone_sq: self.dead_zone_sq,
            output_gain: self.output_gain,
            output_limit: self.output_limit,
        }
    }
}

impl ControllerConfig {
    /// Explicit device path, if one is configured.
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        if self.device_path.is_empty() {
            None
        } else {
            Some(&self.device_path)
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stick_cal::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// println!("Flash image: {}", config.storage.image_path);
    /// # Ok::<(), stick_cal::error::CalError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing or validation fails.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Storage
        if self.storage.image_path.is_empty() {
            return Err(invalid("image_path cannot be empty"));
        }

        if self.storage.page_size < RECORD_LEN || self.storage.page_size > 1 << 20 {
            return Err(invalid(format!(
                "page_size must be between {} and {}",
                RECORD_LEN,
                1 << 20
            )));
        }

        // Controller
        if self.controller.axis_max < 1 {
            return Err(invalid("axis_max must be at least 1"));
        }

        if self.controller.long_press_ms < 100 || self.controller.long_press_ms > 10000 {
            return Err(invalid("long_press_ms must be between 100 and 10000"));
        }

        // Calibration thresholds
        let cal = &self.calibration;
        if cal.sample_interval_ms == 0 || cal.sample_interval_ms > 10000 {
            return Err(invalid("sample_interval_ms must be between 1 and 10000"));
        }

        if cal.stable_spread == 0 || cal.stable_spread > ADC_FULL_SCALE {
            return Err(invalid(format!(
                "stable_spread must be between 1 and {}",
                ADC_FULL_SCALE
            )));
        }

        if !cal.noise_floor_sq.is_finite() || cal.noise_floor_sq < 0.0 {
            return Err(invalid("noise_floor_sq must be a non-negative number"));
        }

        if !(cal.sector_tolerance > 0.0 && cal.sector_tolerance <= 0.5) {
            return Err(invalid("sector_tolerance must be greater than 0.0 and at most 0.5"));
        }

        if cal.trigger_travel_min > ADC_FULL_SCALE {
            return Err(invalid(format!(
                "trigger_travel_min must be at most {}",
                ADC_FULL_SCALE
            )));
        }

        if !(cal.dead_zone_sq >= 0.0 && cal.dead_zone_sq < 1.0) {
            return Err(invalid("dead_zone_sq must be between 0.0 and 1.0 (exclusive)"));
        }

        if !(cal.output_gain.is_finite() && cal.output_gain > 0.0) {
            return Err(invalid("output_gain must be a positive number"));
        }

        if !(cal.output_limit > 0.0 && cal.output_limit <= i16::MAX as f32) {
            return Err(invalid("output_limit must be between 0 (exclusive) and 32767"));
        }

        // Runtime
        if self.runtime.poll_interval_ms == 0 || self.runtime.poll_interval_ms > 100 {
            return Err(invalid("poll_interval_ms must be between 1 and 100"));
        }

        if self.runtime.report_interval_ms > 60000 {
            return Err(invalid("report_interval_ms must be at most 60000"));
        }

        // Logging
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> CalError {
    CalError::Config(toml::de::Error::custom(msg))
}
