//! # Button Events
//!
//! Button identities and the discrete events the dispatcher delivers for them.

/// Buttons the calibration core listens to, plus the rest of the face buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Pair button. Long-press starts calibration.
    Pair,
    /// A button. Click confirms and saves.
    A,
    B,
    X,
    /// Y button. Long-press restores and saves defaults.
    Y,
}

/// Discrete button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Pressed and released before the long-press threshold.
    Click,
    /// Held past the long-press threshold. Fired once while still held.
    LongPress,
    /// Released after a long-press was reported.
    LongPressRelease,
}
