//! # Button Event Tracker
//!
//! Turns raw press/release edges into the discrete [`ButtonEvent`]s the
//! calibrator reacts to.
//!
//! - Release before the long-press threshold: `Click`
//! - Held past the threshold: `LongPress`, once, reported by [`ButtonTracker::poll`]
//! - Release after a reported long press: `LongPressRelease`

use std::time::{Duration, Instant};

use crate::hal::{Button, ButtonEvent};

/// Default hold time before a press counts as a long press.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
struct Held {
    button: Button,
    since: Instant,
    long_reported: bool,
}

/// Press timing per button.
#[derive(Debug)]
pub struct ButtonTracker {
    long_press: Duration,
    held: Vec<Held>,
}

impl Default for ButtonTracker {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS)
    }
}

impl ButtonTracker {
    #[must_use]
    pub fn new(long_press: Duration) -> Self {
        Self {
            long_press,
            held: Vec::new(),
        }
    }

    /// Records a press or release edge at `now`.
    ///
    /// Returns the event completed by a release. A release that arrives past
    /// the threshold before any poll reported it yields `LongPress`.
    /// Repeated presses of a held button are ignored.
    pub fn on_edge(&mut self, button: Button, pressed: bool, now: Instant) -> Option<ButtonEvent> {
        let index = self.held.iter().position(|h| h.button == button);

        match (pressed, index) {
            (true, None) => {
                self.held.push(Held {
                    button,
                    since: now,
                    long_reported: false,
                });
                None
            }
            (true, Some(_)) => None,
            (false, None) => None,
            (false, Some(i)) => {
                let held = self.held.remove(i);
                if held.long_reported {
                    Some(ButtonEvent::LongPressRelease)
                } else if now.saturating_duration_since(held.since) >= self.long_press {
                    Some(ButtonEvent::LongPress)
                } else {
                    Some(ButtonEvent::Click)
                }
            }
        }
    }

    /// Reports every held button that just crossed the long-press threshold.
    pub fn poll(&mut self, now: Instant) -> Vec<(Button, ButtonEvent)> {
        let mut events = Vec::new();
        for held in self.held.iter_mut() {
            if !held.long_reported && now.saturating_duration_since(held.since) >= self.long_press {
                held.long_reported = true;
                events.push((held.button, ButtonEvent::LongPress));
            }
        }
        events
    }
}
