//! # Controller Input Mapper Module
//!
//! This module handles parsing raw evdev events from the gamepad and turning
//! them into the six-channel [`ChannelSnapshot`] the calibration core samples,
//! plus button edges for the [`ButtonTracker`](super::buttons::ButtonTracker).
//!
//! ## Axis Codes (EV_ABS)
//!
//! | Channel | evdev Code |
//! |---------|------------|
//! | Left stick X | ABS_X |
//! | Left stick Y | ABS_Y |
//! | Right stick X | ABS_Z |
//! | Right stick Y | ABS_RZ |
//! | Left hall trigger | ABS_RX |
//! | Right hall trigger | ABS_RY |
//!
//! Raw values in `0..=axis_max` are rescaled to the 12-bit ADC range. Stick
//! Y axes are flipped so that pushing up increases the value.
//!
//! ## Button Codes (EV_KEY)
//!
//! | Button | evdev Code |
//! |--------|------------|
//! | A | BTN_SOUTH |
//! | B | BTN_EAST |
//! | X | BTN_WEST |
//! | Y | BTN_NORTH |
//! | Pair | BTN_MODE |
//!
//! ## Usage
//!
//! ```no_run
//! use stick_cal::controller::gamepad::Gamepad;
//! use stick_cal::controller::mapper::EventMapper;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stream = Gamepad::open(None)?.into_event_stream()?;
//! let mut mapper = EventMapper::new(255);
//!
//! loop {
//!     let event = stream.next_event().await?;
//!     if let Some((button, pressed)) = mapper.process_event(&event) {
//!         println!("{:?} pressed: {}", button, pressed);
//!     }
//!     let snapshot = mapper.snapshot();
//!     // Feed the snapshot to the calibrator...
//! }
//! # }
//! ```

use evdev::{AbsoluteAxisType, InputEvent, InputEventKind, Key};

use crate::hal::{AdcChannel, Button, ChannelSnapshot, SampleSource, ADC_FULL_SCALE};

/// Stick reading at rest before any axis event arrives.
pub const STICK_REST: u16 = 2048;

/// Parses raw evdev events and maintains the latest channel snapshot.
///
/// # Thread Safety
///
/// `EventMapper` is not thread-safe. Use from a single task/thread only.
///
/// # Examples
///
/// ```
/// use stick_cal::controller::mapper::EventMapper;
///
/// let mapper = EventMapper::new(255);
/// let snapshot = mapper.snapshot();
/// assert_eq!(snapshot.left_x, 2048);
/// assert_eq!(snapshot.left_hall, 0);
/// ```
#[derive(Debug)]
pub struct EventMapper {
    axis_max: i32,
    snapshot: ChannelSnapshot,
}

impl EventMapper {
    /// Creates a mapper for a device whose axes report `0..=axis_max`.
    #[must_use]
    pub fn new(axis_max: i32) -> Self {
        Self {
            axis_max: axis_max.max(1),
            snapshot: rest_snapshot(),
        }
    }

    /// Latest values of all six channels.
    #[must_use]
    pub fn snapshot(&self) -> ChannelSnapshot {
        self.snapshot
    }

    /// Processes a single evdev input event.
    ///
    /// Axis events update the snapshot. Key events for mapped buttons are
    /// returned as `(button, pressed)` edges; key repeats (value 2) are
    /// dropped.
    ///
    /// # Arguments
    ///
    /// * `event` - The evdev input event to process
    ///
    /// # Returns
    ///
    /// The button edge, if the event was one.
    pub fn process_event(&mut self, event: &InputEvent) -> Option<(Button, bool)> {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => {
                self.process_axis_event(axis, event.value());
                None
            }
            InputEventKind::Key(key) => match event.value() {
                0 => map_key(key).map(|button| (button, false)),
                1 => map_key(key).map(|button| (button, true)),
                _ => None,
            },
            // Sync and other event types
            _ => None,
        }
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) {
        let (channel, flip) = match axis {
            AbsoluteAxisType::ABS_X => (AdcChannel::LeftX, false),
            AbsoluteAxisType::ABS_Y => (AdcChannel::LeftY, true),
            AbsoluteAxisType::ABS_Z => (AdcChannel::RightX, false),
            AbsoluteAxisType::ABS_RZ => (AdcChannel::RightY, true),
            AbsoluteAxisType::ABS_RX => (AdcChannel::LeftHall, false),
            AbsoluteAxisType::ABS_RY => (AdcChannel::RightHall, false),
            // D-pad, gyro, accelerometer, etc.
            _ => return,
        };

        let scaled = self.scale(value);
        let scaled = if flip { ADC_FULL_SCALE - scaled } else { scaled };
        self.snapshot.set(channel, scaled);
    }

    /// Rescales a raw device value into `0..=ADC_FULL_SCALE`.
    fn scale(&self, value: i32) -> u16 {
        let clamped = value.clamp(0, self.axis_max) as i64;
        (clamped * ADC_FULL_SCALE as i64 / self.axis_max as i64) as u16
    }
}

impl SampleSource for EventMapper {
    fn sample(&mut self, channel: AdcChannel) -> u16 {
        self.snapshot.get(channel)
    }
}

fn rest_snapshot() -> ChannelSnapshot {
    ChannelSnapshot {
        left_x: STICK_REST,
        left_y: STICK_REST,
        right_x: STICK_REST,
        right_y: STICK_REST,
        left_hall: 0,
        right_hall: 0,
    }
}

fn map_key(key: Key) -> Option<Button> {
    match key {
        Key::BTN_SOUTH => Some(Button::A),
        Key::BTN_EAST => Some(Button::B),
        Key::BTN_WEST => Some(Button::X),
        Key::BTN_NORTH => Some(Button::Y),
        Key::BTN_MODE => Some(Button::Pair),
        _ => None,
    }
}
