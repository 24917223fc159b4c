//! # ADC Sample Source
//!
//! Six named analog channels, each sampled as a 12-bit unsigned value.

/// Largest value a 12-bit ADC conversion can return.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Analog channels read by the calibration core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdcChannel {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftHall,
    RightHall,
}

impl AdcChannel {
    /// All channels in snapshot order.
    pub const ALL: [AdcChannel; 6] = [
        AdcChannel::LeftX,
        AdcChannel::LeftY,
        AdcChannel::RightX,
        AdcChannel::RightY,
        AdcChannel::LeftHall,
        AdcChannel::RightHall,
    ];
}

/// Supplies the latest raw conversion for a channel.
///
/// Implementations must return values in `0..=ADC_FULL_SCALE`.
pub trait SampleSource {
    /// Returns the most recent sample for `channel`.
    fn sample(&mut self, channel: AdcChannel) -> u16;
}

/// One reading of all six channels taken at the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSnapshot {
    pub left_x: u16,
    pub left_y: u16,
    pub right_x: u16,
    pub right_y: u16,
    pub left_hall: u16,
    pub right_hall: u16,
}

impl ChannelSnapshot {
    /// Reads every channel from `source`.
    pub fn capture<S: SampleSource + ?Sized>(source: &mut S) -> Self {
        Self {
            left_x: source.sample(AdcChannel::LeftX),
            left_y: source.sample(AdcChannel::LeftY),
            right_x: source.sample(AdcChannel::RightX),
            right_y: source.sample(AdcChannel::RightY),
            left_hall: source.sample(AdcChannel::LeftHall),
            right_hall: source.sample(AdcChannel::RightHall),
        }
    }

    /// Returns the value recorded for `channel`.
    #[must_use]
    pub fn get(&self, channel: AdcChannel) -> u16 {
        match channel {
            AdcChannel::LeftX => self.left_x,
            AdcChannel::LeftY => self.left_y,
            AdcChannel::RightX => self.right_x,
            AdcChannel::RightY => self.right_y,
            AdcChannel::LeftHall => self.left_hall,
            AdcChannel::RightHall => self.right_hall,
        }
    }

    /// Overwrites the value recorded for `channel`.
    pub fn set(&mut self, channel: AdcChannel, value: u16) {
        match channel {
            AdcChannel::LeftX => self.left_x = value,
            AdcChannel::LeftY => self.left_y = value,
            AdcChannel::RightX => self.right_x = value,
            AdcChannel::RightY => self.right_y = value,
            AdcChannel::LeftHall => self.left_hall = value,
            AdcChannel::RightHall => self.right_hall = value,
        }
    }
}

/// A snapshot can stand in for a live source, which keeps tests and replays simple.
impl SampleSource for ChannelSnapshot {
    fn sample(&mut self, channel: AdcChannel) -> u16 {
        self.get(channel)
    }
}
