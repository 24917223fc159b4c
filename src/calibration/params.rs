//! # Calibration Parameters
//!
//! The persisted data model and its fixed-size record encoding.
//!
//! ## Record Layout
//!
//! All fields little-endian, in this order:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 8 | left center X/Y, right center X/Y (u16 each) |
//! | 8 | 120 | left radius table (60 × u16) |
//! | 128 | 120 | right radius table (60 × u16) |
//! | 248 | 4 | left trigger [min, max] (u16 each) |
//! | 252 | 4 | right trigger [min, max] (u16 each) |
//! | 256 | 4 | CRC-32 over bytes 0..256 |

use bytes::{Buf, BufMut, BytesMut};

use super::crc::crc32;
use super::{Side, SECTOR_COUNT};

/// Default stick center, mid-scale of the ADC range.
pub const DEFAULT_CENTER: u16 = 2048;

/// Default per-sector radius.
pub const DEFAULT_RADIUS: u16 = 2048;

/// Default trigger travel, rest to full scale.
pub const DEFAULT_TRIGGER_RANGE: [u16; 2] = [0, 4096];

/// Offset of the checksum, equal to the number of bytes it covers.
pub const CHECKSUM_OFFSET: usize = 4 * 2 + 2 * SECTOR_COUNT * 2 + 2 * 2 * 2;

/// Total record length in bytes.
pub const RECORD_LEN: usize = CHECKSUM_OFFSET + 4;

/// Calibration parameters for both sticks and both triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationParameters {
    pub left_center_x: u16,
    pub left_center_y: u16,
    pub right_center_x: u16,
    pub right_center_y: u16,
    /// Largest center-relative magnitude seen in each sector of the left stick.
    pub left_radius: [u16; SECTOR_COUNT],
    /// Largest center-relative magnitude seen in each sector of the right stick.
    pub right_radius: [u16; SECTOR_COUNT],
    /// Left trigger hall reading at rest and at full travel.
    pub left_trigger: [u16; 2],
    /// Right trigger hall reading at rest and at full travel.
    pub right_trigger: [u16; 2],
    pub checksum: u32,
}

impl Default for CalibrationParameters {
    fn default() -> Self {
        let mut params = Self {
            left_center_x: DEFAULT_CENTER,
            left_center_y: DEFAULT_CENTER,
            right_center_x: DEFAULT_CENTER,
            right_center_y: DEFAULT_CENTER,
            left_radius: [DEFAULT_RADIUS; SECTOR_COUNT],
            right_radius: [DEFAULT_RADIUS; SECTOR_COUNT],
            left_trigger: DEFAULT_TRIGGER_RANGE,
            right_trigger: DEFAULT_TRIGGER_RANGE,
            checksum: 0,
        };
        params.checksum = params.compute_checksum();
        params
    }
}

impl CalibrationParameters {
    /// Stick center `(x, y)` for `side`.
    #[must_use]
    pub fn center(&self, side: Side) -> (u16, u16) {
        match side {
            Side::Left => (self.left_center_x, self.left_center_y),
            Side::Right => (self.right_center_x, self.right_center_y),
        }
    }

    pub fn set_center(&mut self, side: Side, x: u16, y: u16) {
        match side {
            Side::Left => {
                self.left_center_x = x;
                self.left_center_y = y;
            }
            Side::Right => {
                self.right_center_x = x;
                self.right_center_y = y;
            }
        }
    }

    /// Radius table for `side`.
    #[must_use]
    pub fn radius_table(&self, side: Side) -> &[u16; SECTOR_COUNT] {
        match side {
            Side::Left => &self.left_radius,
            Side::Right => &self.right_radius,
        }
    }

    pub fn radius_table_mut(&mut self, side: Side) -> &mut [u16; SECTOR_COUNT] {
        match side {
            Side::Left => &mut self.left_radius,
            Side::Right => &mut self.right_radius,
        }
    }

    /// Trigger `[min, max]` for `side`.
    #[must_use]
    pub fn trigger(&self, side: Side) -> [u16; 2] {
        match side {
            Side::Left => self.left_trigger,
            Side::Right => self.right_trigger,
        }
    }

    pub fn trigger_mut(&mut self, side: Side) -> &mut [u16; 2] {
        match side {
            Side::Left => &mut self.left_trigger,
            Side::Right => &mut self.right_trigger,
        }
    }

    /// CRC-32 over every field except the stored checksum.
    #[must_use]
    pub fn compute_checksum(&self) -> u32 {
        let bytes = self.to_bytes();
        crc32(&bytes[..CHECKSUM_OFFSET])
    }

    /// Returns whether the stored checksum matches the contents.
    #[must_use]
    pub fn is_checksum_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Encodes the record, stored checksum included, as written to flash.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut buf = BytesMut::with_capacity(RECORD_LEN);

        buf.put_u16_le(self.left_center_x);
        buf.put_u16_le(self.left_center_y);
        buf.put_u16_le(self.right_center_x);
        buf.put_u16_le(self.right_center_y);
        for &r in self.left_radius.iter().chain(self.right_radius.iter()) {
            buf.put_u16_le(r);
        }
        for &t in self.left_trigger.iter().chain(self.right_trigger.iter()) {
            buf.put_u16_le(t);
        }
        buf.put_u32_le(self.checksum);

        let mut record = [0u8; RECORD_LEN];
        record.copy_from_slice(&buf);
        record
    }

    /// Decodes a record. The checksum is taken as stored, not verified.
    #[must_use]
    pub fn from_bytes(record: &[u8; RECORD_LEN]) -> Self {
        let mut buf = &record[..];

        let left_center_x = buf.get_u16_le();
        let left_center_y = buf.get_u16_le();
        let right_center_x = buf.get_u16_le();
        let right_center_y = buf.get_u16_le();

        let mut left_radius = [0u16; SECTOR_COUNT];
        for r in left_radius.iter_mut() {
            *r = buf.get_u16_le();
        }
        let mut right_radius = [0u16; SECTOR_COUNT];
        for r in right_radius.iter_mut() {
            *r = buf.get_u16_le();
        }

        let left_trigger = [buf.get_u16_le(), buf.get_u16_le()];
        let right_trigger = [buf.get_u16_le(), buf.get_u16_le()];
        let checksum = buf.get_u32_le();

        Self {
            left_center_x,
            left_center_y,
            right_center_x,
            right_center_y,
            left_radius,
            right_radius,
            left_trigger,
            right_trigger,
            checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> CalibrationParameters {
        let mut params = CalibrationParameters::default();
        params.set_center(Side::Left, 2020, 2070);
        params.set_center(Side::Right, 1990, 2101);
        for (i, r) in params.left_radius.iter_mut().enumerate() {
            *r = 1500 + i as u16;
        }
        for (i, r) in params.right_radius.iter_mut().enumerate() {
            *r = 1700 - i as u16;
        }
        params.left_trigger = [12, 3400];
        params.right_trigger = [30, 3550];
        params.checksum = params.compute_checksum();
        params
    }

    #[test]
    fn test_record_length() {
        assert_eq!(CHECKSUM_OFFSET, 256);
        assert_eq!(RECORD_LEN, 260);
    }

    #[test]
    fn test_defaults() {
        let params = CalibrationParameters::default();
        assert_eq!(params.center(Side::Left), (2048, 2048));
        assert_eq!(params.center(Side::Right), (2048, 2048));
        assert!(params.left_radius.iter().all(|&r| r == 2048));
        assert!(params.right_radius.iter().all(|&r| r == 2048));
        assert_eq!(params.trigger(Side::Left), [0, 4096]);
        assert_eq!(params.trigger(Side::Right), [0, 4096]);
        assert!(params.is_checksum_valid());
    }

    #[test]
    fn test_layout_is_little_endian_in_field_order() {
        let params = sample_params();
        let bytes = params.to_bytes();

        assert_eq!(&bytes[0..2], &2020u16.to_le_bytes());
        assert_eq!(&bytes[2..4], &2070u16.to_le_bytes());
        assert_eq!(&bytes[4..6], &1990u16.to_le_bytes());
        assert_eq!(&bytes[6..8], &2101u16.to_le_bytes());
        assert_eq!(&bytes[8..10], &1500u16.to_le_bytes());
        assert_eq!(&bytes[128..130], &1700u16.to_le_bytes());
        assert_eq!(&bytes[248..250], &12u16.to_le_bytes());
        assert_eq!(&bytes[254..256], &3550u16.to_le_bytes());
        assert_eq!(&bytes[256..260], &params.checksum.to_le_bytes());
    }

    #[test]
    fn test_decode_restores_every_field() {
        let params = sample_params();
        let decoded = CalibrationParameters::from_bytes(&params.to_bytes());
        assert_eq!(decoded, params);
        assert!(decoded.is_checksum_valid());
    }

    #[test]
    fn test_checksum_ignores_stored_checksum_field() {
        let mut params = sample_params();
        let expected = params.compute_checksum();
        params.checksum = 0xDEAD_BEEF;
        assert_eq!(params.compute_checksum(), expected);
        assert!(!params.is_checksum_valid());
    }

    #[test]
    fn test_single_field_change_invalidates_checksum() {
        let mut params = sample_params();
        params.right_radius[42] += 1;
        assert!(!params.is_checksum_valid());
    }

    #[test]
    fn test_side_accessors() {
        let mut params = CalibrationParameters::default();
        params.radius_table_mut(Side::Right)[7] = 99;
        params.trigger_mut(Side::Left)[1] = 600;

        assert_eq!(params.radius_table(Side::Right)[7], 99);
        assert_eq!(params.radius_table(Side::Left)[7], DEFAULT_RADIUS);
        assert_eq!(params.trigger(Side::Left), [0, 600]);
    }
}
