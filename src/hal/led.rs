//! # LED Presentation
//!
//! Visual states used to tell the operator which calibration phase is active.

use tracing::info;

/// LED styles understood by the presentation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedStyle {
    /// Steady on. Idle.
    On,
    /// Slow breathing. Finding centers, or all sectors found.
    Breathing,
    /// Blinking. Sweeping the sticks for their extents.
    Blinking,
}

/// Accepts LED style changes.
pub trait Indicator {
    fn set_style(&mut self, style: LedStyle);
}

/// Host indicator that reports style changes through the log.
#[derive(Debug, Default, Clone)]
pub struct LogIndicator {
    current: Option<LedStyle>,
}

impl LogIndicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last style that was set, if any.
    #[must_use]
    pub fn current(&self) -> Option<LedStyle> {
        self.current
    }
}

impl Indicator for LogIndicator {
    fn set_style(&mut self, style: LedStyle) {
        if self.current != Some(style) {
            info!("LED style: {:?}", style);
        }
        self.current = Some(style);
    }
}
