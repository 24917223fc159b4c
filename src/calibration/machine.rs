//! # Calibration State Machine
//!
//! Drives the operator-guided calibration cycle:
//!
//! ```text
//!          Pair long-press            window settled
//!   Idle ------------------> FindCenter -------------> FindMargin
//!    ^                                                     |
//!    +------ A click (save) / Y long-press (defaults) -----+
//! ```
//!
//! - **FindCenter** samples all six channels every 100 ms into a 20-entry
//!   window. Once every channel spreads less than the stability threshold,
//!   the midpoints become the stick centers and trigger rest points.
//! - **FindMargin** records, on every poll, the largest center-relative
//!   magnitude per angular sector of each stick and the largest hall reading
//!   per trigger. When every sector is non-zero and both triggers have
//!   enough travel, the LED switches to breathing; the operator then confirms.
//!
//! ## LED Styles
//!
//! | Phase | Style |
//! |-------|-------|
//! | Idle | On |
//! | FindCenter | Breathing |
//! | FindMargin | Blinking |
//! | FindMargin, all sectors found | Breathing |

use std::time::Instant;

use tracing::{debug, info};

use super::params::CalibrationParameters;
use super::stick::{correct_stick, nearest_sector, stick_angle, trigger_travel, Vector2};
use super::store::{log_params, ParameterStore};
use super::window::SampleWindow;
use super::{Side, Tuning, WINDOW_LEN};
use crate::error::Result;
use crate::hal::{
    AdcChannel, Button, ButtonEvent, ChannelSnapshot, Clock, Indicator, LedStyle, SampleSource,
};
use crate::storage::FlashPage;

/// Calibration phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    /// Not calibrating.
    Idle,
    /// Waiting for the sticks and triggers to settle at rest.
    FindCenter,
    /// Recording stick extents and trigger travel.
    FindMargin,
}

/// The calibration subsystem.
///
/// Owns the parameter store, the LED indicator and the time source.
/// Constructed once at startup, then driven by [`Calibrator::process`] on
/// every scheduler tick and by [`Calibrator::handle_button`] for each
/// dispatched button event.
pub struct Calibrator<F: FlashPage, L: Indicator, C: Clock> {
    store: ParameterStore<F>,
    indicator: L,
    clock: C,
    tuning: Tuning,
    status: CalibrationStatus,
    window: SampleWindow<ChannelSnapshot, WINDOW_LEN>,
    last_sample: Option<Instant>,
    extents_found: bool,
}

impl<F: FlashPage, L: Indicator, C: Clock> Calibrator<F, L, C> {
    /// Creates an idle calibrator around already-loaded parameters.
    pub fn new(store: ParameterStore<F>, mut indicator: L, clock: C, tuning: Tuning) -> Self {
        indicator.set_style(LedStyle::On);

        Self {
            store,
            indicator,
            clock,
            tuning,
            status: CalibrationStatus::Idle,
            window: SampleWindow::new(),
            last_sample: None,
            extents_found: false,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn status(&self) -> CalibrationStatus {
        self.status
    }

    /// Current parameters, read-only.
    #[must_use]
    pub fn params(&self) -> &CalibrationParameters {
        self.store.get()
    }

    /// Returns whether every sector and both triggers have been found in the
    /// current extent collection.
    #[must_use]
    pub fn all_sectors_found(&self) -> bool {
        self.status == CalibrationStatus::FindMargin && self.extents_found
    }

    #[must_use]
    pub fn store(&self) -> &ParameterStore<F> {
        &self.store
    }

    /// Corrects a raw stick sample with the current parameters.
    #[must_use]
    pub fn correct(&self, side: Side, raw: Vector2) -> Vector2 {
        correct_stick(self.store.get(), side, raw, &self.tuning)
    }

    /// Normalized trigger travel with the current parameters.
    #[must_use]
    pub fn trigger(&self, side: Side, raw: u16) -> f32 {
        trigger_travel(self.store.get(), side, raw)
    }

    /// Periodic entry point. Call at the scheduler cadence.
    pub fn process<S: SampleSource + ?Sized>(&mut self, source: &mut S) {
        match self.status {
            CalibrationStatus::Idle => {}
            CalibrationStatus::FindCenter => self.find_center(source),
            CalibrationStatus::FindMargin => self.find_margin(source),
        }
    }

    /// Reacts to a dispatched button event.
    ///
    /// - Pair long-press starts calibration, only from Idle.
    /// - A click saves the collected parameters, only in FindMargin.
    /// - Y long-press saves the defaults, only in FindMargin.
    ///
    /// Everything else is ignored.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if saving fails. The calibrator then stays
    /// in FindMargin so the action can be retried.
    pub fn handle_button(&mut self, button: Button, event: ButtonEvent) -> Result<()> {
        match (button, event) {
            (Button::Pair, ButtonEvent::LongPress) => {
                if self.status == CalibrationStatus::Idle {
                    self.enter_find_center();
                }
            }
            (Button::A, ButtonEvent::Click) => {
                if self.status == CalibrationStatus::FindMargin {
                    self.store.save()?;
                    self.enter_idle();
                }
            }
            (Button::Y, ButtonEvent::LongPress) => {
                if self.status == CalibrationStatus::FindMargin {
                    info!("Restoring default calibration parameters");
                    self.store.restore_defaults()?;
                    self.enter_idle();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn enter_idle(&mut self) {
        self.indicator.set_style(LedStyle::On);
        self.status = CalibrationStatus::Idle;
        info!("Calibration done");
        log_params(self.store.get());
    }

    fn enter_find_center(&mut self) {
        self.indicator.set_style(LedStyle::Breathing);
        self.window.clear();
        self.last_sample = None;
        self.status = CalibrationStatus::FindCenter;
        info!("Calibration started, finding centers");
    }

    fn enter_find_margin(&mut self) {
        let params = self.store.params_mut();
        for side in Side::BOTH {
            params.radius_table_mut(side).fill(0);
            params.trigger_mut(side)[1] = 0;
        }

        self.extents_found = false;
        self.indicator.set_style(LedStyle::Blinking);
        self.status = CalibrationStatus::FindMargin;
        info!("Finding stick extents and trigger travel");
    }

    fn find_center<S: SampleSource + ?Sized>(&mut self, source: &mut S) {
        if let Some(last) = self.last_sample {
            if self.clock.elapsed_since(last) < self.tuning.sample_interval {
                return;
            }
        }
        self.last_sample = Some(self.clock.now());

        self.window.push(ChannelSnapshot::capture(source));
        if !self.window.is_full() {
            return;
        }

        let (min, max) = window_bounds(&self.window);
        let spread = |channel| max.get(channel) - min.get(channel);
        let settled = AdcChannel::ALL
            .iter()
            .all(|&channel| spread(channel) < self.tuning.stable_spread);

        if !settled {
            debug!(
                "Center window not settled, spreads: {:?}",
                AdcChannel::ALL.map(spread)
            );
            return;
        }

        let mid = |channel| ((min.get(channel) as u32 + max.get(channel) as u32) / 2) as u16;
        let params = self.store.params_mut();
        params.set_center(Side::Left, mid(AdcChannel::LeftX), mid(AdcChannel::LeftY));
        params.set_center(Side::Right, mid(AdcChannel::RightX), mid(AdcChannel::RightY));
        params.trigger_mut(Side::Left)[0] = mid(AdcChannel::LeftHall);
        params.trigger_mut(Side::Right)[0] = mid(AdcChannel::RightHall);

        info!(
            "Centers found: left {}, {} right {}, {} triggers {}, {}",
            params.left_center_x,
            params.left_center_y,
            params.right_center_x,
            params.right_center_y,
            params.left_trigger[0],
            params.right_trigger[0]
        );

        self.enter_find_margin();
    }

    fn find_margin<S: SampleSource + ?Sized>(&mut self, source: &mut S) {
        let snapshot = ChannelSnapshot::capture(source);
        let tuning = self.tuning;
        let params = self.store.params_mut();

        record_extent(params, Side::Left, snapshot.left_x, snapshot.left_y, &tuning);
        record_extent(params, Side::Right, snapshot.right_x, snapshot.right_y, &tuning);

        let left = params.trigger_mut(Side::Left);
        left[1] = left[1].max(snapshot.left_hall);
        let right = params.trigger_mut(Side::Right);
        right[1] = right[1].max(snapshot.right_hall);

        if !self.extents_found && extents_complete(params, &tuning) {
            self.extents_found = true;
            self.indicator.set_style(LedStyle::Breathing);
            info!("All sectors found, press A to save");
        }
    }
}

/// Per-channel minimum and maximum over the window.
fn window_bounds(
    window: &SampleWindow<ChannelSnapshot, WINDOW_LEN>,
) -> (ChannelSnapshot, ChannelSnapshot) {
    let mut min = ChannelSnapshot::default();
    let mut max = ChannelSnapshot::default();
    for channel in AdcChannel::ALL {
        min.set(channel, u16::MAX);
    }

    for sample in window.iter() {
        for channel in AdcChannel::ALL {
            min.set(channel, min.get(channel).min(sample.get(channel)));
            max.set(channel, max.get(channel).max(sample.get(channel)));
        }
    }

    (min, max)
}

/// Raises the sector maximum for one stick sample if it sets a new record.
fn record_extent(params: &mut CalibrationParameters, side: Side, x: u16, y: u16, tuning: &Tuning) {
    let (center_x, center_y) = params.center(side);
    let v = Vector2::new(x as f32 - center_x as f32, y as f32 - center_y as f32);

    // Near center the angle is too noisy to bin
    let sqr_mag = v.sqr_magnitude();
    if sqr_mag <= tuning.noise_floor_sq {
        return;
    }

    let Some(sector) = nearest_sector(stick_angle(v), tuning.sector_tolerance) else {
        return;
    };

    let table = params.radius_table_mut(side);
    let stored = table[sector] as f32;
    if sqr_mag > stored * stored {
        table[sector] = sqr_mag.sqrt() as u16;
        debug!("{:?} sector {} radius {}", side, sector, table[sector]);
    }
}

/// Every sector of both sticks is non-zero and both triggers travel far enough.
fn extents_complete(params: &CalibrationParameters, tuning: &Tuning) -> bool {
    Side::BOTH.iter().all(|&side| {
        let [min, max] = params.trigger(side);
        params.radius_table(side).iter().all(|&r| r != 0)
            && max as u32 >= min as u32 + tuning.trigger_travel_min as u32
    })
}
