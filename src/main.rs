//! # Stick Cal
//!
//! Calibrate the analog sticks and hall-effect triggers of a gamepad.
//!
//! This application runs the calibration core against a live evdev gamepad,
//! persisting parameters to a flash page image on disk.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use stick_cal::calibration::{Calibrator, ParameterStore, Side, Vector2};
use stick_cal::config::{Config, LoggingConfig};
use stick_cal::controller::{ButtonTracker, EventMapper, Gamepad};
use stick_cal::hal::{Button, ButtonEvent, Clock, Indicator, LogIndicator, MonotonicClock};
use stick_cal::storage::{FileFlash, FlashPage};

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the daily rolling log
const LOG_FILE_PREFIX: &str = "stick-cal.log";

/// Main entry point for Stick Cal
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging
///    - Open the flash page image and load saved parameters
///    - Open the gamepad event stream
///
/// 2. **Main Loop**
///    - Map gamepad events to channel samples and button edges
///    - On every poll tick: report long presses, advance the calibrator,
///      and periodically log the corrected stick output
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - The configuration file is invalid
/// - The flash image cannot be opened
/// - No gamepad is found or the gamepad disconnects
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO stick_cal: Stick Cal v0.1.0 starting...
/// INFO stick_cal::calibration::store: Using saved calibration parameters
/// INFO stick_cal::controller::gamepad: Found gamepad at: /dev/input/event7
/// INFO stick_cal: Hold Pair to start calibration
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (config, from_file) = load_config(&config_path)?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&config.logging);

    info!("Stick Cal v{} starting...", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Configuration loaded from {}", config_path);
    } else {
        warn!("{} not found, using default configuration", config_path);
    }

    let flash = FileFlash::open(&config.storage.image_path, config.storage.page_size)
        .with_context(|| format!("Failed to open flash image {}", config.storage.image_path))?;
    let store = ParameterStore::load(flash);
    let mut calibrator = Calibrator::new(
        store,
        LogIndicator::new(),
        MonotonicClock::new(),
        config.calibration.tuning(),
    );

    let gamepad = Gamepad::open(config.controller.device())?;
    info!("Gamepad: {}", gamepad.name().unwrap_or("unnamed"));
    let mut events = gamepad.into_event_stream()?;

    let mut mapper = EventMapper::new(config.controller.axis_max);
    let mut buttons = ButtonTracker::new(Duration::from_millis(config.controller.long_press_ms));

    let mut poll = interval(Duration::from_millis(config.runtime.poll_interval_ms));
    let report_interval = Duration::from_millis(config.runtime.report_interval_ms);
    let mut last_report = Instant::now();

    info!("Hold Pair to start calibration");
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            event = events.next_event() => {
                let event = event.context("Gamepad read failed")?;
                if let Some((button, pressed)) = mapper.process_event(&event) {
                    if let Some(button_event) = buttons.on_edge(button, pressed, Instant::now()) {
                        dispatch(&mut calibrator, button, button_event);
                    }
                }
            }

            _ = poll.tick() => {
                for (button, button_event) in buttons.poll(Instant::now()) {
                    dispatch(&mut calibrator, button, button_event);
                }

                calibrator.process(&mut mapper);

                if report_due(report_interval, last_report.elapsed()) {
                    report(&calibrator, &mapper);
                    last_report = Instant::now();
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    Ok(())
}

/// Loads the configuration file, or the defaults if it does not exist.
///
/// Returns the configuration and whether it came from the file.
fn load_config(path: &str) -> Result<(Config, bool)> {
    if !Path::new(path).exists() {
        return Ok((Config::default(), false));
    }

    let config = Config::load(path).with_context(|| format!("Invalid configuration in {}", path))?;
    Ok((config, true))
}

/// Installs the console layer and, if a log directory is set, a daily
/// rolling file layer. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.log_dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Some(guard)
}

fn dispatch<F: FlashPage, L: Indicator, C: Clock>(
    calibrator: &mut Calibrator<F, L, C>,
    button: Button,
    event: ButtonEvent,
) {
    debug!("{:?} {:?}", button, event);
    if let Err(e) = calibrator.handle_button(button, event) {
        error!("Failed to save calibration, try again: {}", e);
    }
}

fn report_due(interval: Duration, elapsed: Duration) -> bool {
    !interval.is_zero() && elapsed >= interval
}

/// Logs the corrected output for the current stick and trigger readings.
fn report<F: FlashPage, L: Indicator, C: Clock>(
    calibrator: &Calibrator<F, L, C>,
    mapper: &EventMapper,
) {
    let s = mapper.snapshot();
    let left = calibrator.correct(Side::Left, Vector2::new(s.left_x as f32, s.left_y as f32));
    let right = calibrator.correct(Side::Right, Vector2::new(s.right_x as f32, s.right_y as f32));

    info!(
        "{:?}: left ({:.0}, {:.0}) right ({:.0}, {:.0}) triggers {:.2} {:.2}",
        calibrator.status(),
        left.x,
        left.y,
        right.x,
        right.y,
        calibrator.trigger(Side::Left, s.left_hall),
        calibrator.trigger(Side::Right, s.right_hall)
    );
}
