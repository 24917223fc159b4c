//! # Stick Correction
//!
//! Angle and sector helpers shared by extent collection and the correction
//! transform, plus the transform itself.
//!
//! ## Angle Convention
//!
//! Angles are measured from the positive Y axis and sweep the full 0..2π
//! range by reflecting through the sign of X:
//!
//! ```text
//!            +Y (0)
//!             |
//!  -X (3π/2) -+- +X (π/2)
//!             |
//!            -Y (π)
//! ```
//!
//! The range is split into [`SECTOR_COUNT`] equal sectors; sector `k` is
//! centered on angle `k * SECTOR_WIDTH`.

use std::f32::consts::PI;

use super::params::CalibrationParameters;
use super::{Side, Tuning, SECTOR_COUNT};

/// Angular width of one sector.
pub const SECTOR_WIDTH: f32 = 2.0 * PI / SECTOR_COUNT as f32;

/// Two-component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn sqr_magnitude(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.sqr_magnitude().sqrt()
    }
}

/// Angle of `v` in 0..=2π, measured from +Y.
///
/// A zero vector yields NaN; callers rely on later guards rather than a
/// special case here.
#[must_use]
pub fn stick_angle(v: Vector2) -> f32 {
    let cos = (v.y / v.magnitude()).clamp(-1.0, 1.0);
    let angle = cos.acos();

    if v.x < 0.0 {
        2.0 * PI - angle
    } else {
        angle
    }
}

/// Fractional sector index for `angle`.
#[inline]
#[must_use]
pub fn sector_position(angle: f32) -> f32 {
    angle / SECTOR_WIDTH
}

/// Sector whose center lies within `tolerance` sectors of `angle`.
///
/// Returns `None` when the angle sits between sector centers, so one noisy
/// reading can never land in two adjacent sectors.
#[must_use]
pub fn nearest_sector(angle: f32, tolerance: f32) -> Option<usize> {
    let position = sector_position(angle);
    let nearest = position.round();

    if (position - nearest).abs() < tolerance {
        Some(nearest as usize % SECTOR_COUNT)
    } else {
        None
    }
}

/// Radius at fractional sector `position`, interpolated between the two
/// bracketing sectors. Indices wrap across the 0/2π boundary.
#[must_use]
pub fn interpolated_radius(table: &[u16; SECTOR_COUNT], position: f32) -> f32 {
    let before = position.floor();
    let next = position.ceil();
    let lo = table[before as usize % SECTOR_COUNT] as f32;

    if before == next {
        lo
    } else {
        let hi = table[next as usize % SECTOR_COUNT] as f32;
        (position - before) * hi + (next - position) * lo
    }
}

/// Converts a raw stick sample into a report-ready vector.
///
/// 1. Subtracts the stored center for `side`.
/// 2. Normalizes by the radius interpolated at the sample's angle.
/// 3. Forces vectors inside the dead zone to exactly zero.
/// 4. Scales by the output gain and clamps each axis to the report range.
///
/// # Examples
///
/// ```
/// use stick_cal::calibration::{correct_stick, CalibrationParameters, Side, Tuning, Vector2};
///
/// let params = CalibrationParameters::default();
/// let tuning = Tuning::default();
///
/// // At rest
/// let out = correct_stick(&params, Side::Left, Vector2::new(2048.0, 2048.0), &tuning);
/// assert_eq!(out, Vector2::ZERO);
///
/// // Full deflection is clamped to the signed 16-bit range
/// let out = correct_stick(&params, Side::Left, Vector2::new(4095.0, 2048.0), &tuning);
/// assert_eq!(out.x, 32767.0);
/// ```
#[must_use]
pub fn correct_stick(
    params: &CalibrationParameters,
    side: Side,
    raw: Vector2,
    tuning: &Tuning,
) -> Vector2 {
    let (center_x, center_y) = params.center(side);
    let v = Vector2::new(raw.x - center_x as f32, raw.y - center_y as f32);

    let position = sector_position(stick_angle(v));
    let radius = interpolated_radius(params.radius_table(side), position);

    // Sectors not yet found during extent collection read as zero
    if !(radius.is_finite() && radius > 0.0) {
        return Vector2::ZERO;
    }

    let normalized = Vector2::new(v.x / radius, v.y / radius);
    if normalized.sqr_magnitude() < tuning.dead_zone_sq {
        return Vector2::ZERO;
    }

    let limit = tuning.output_limit;
    Vector2::new(
        (normalized.x * tuning.output_gain).clamp(-limit, limit),
        (normalized.y * tuning.output_gain).clamp(-limit, limit),
    )
}

/// Trigger travel in 0.0..=1.0 using the stored `[min, max]` range.
///
/// An empty or inverted range yields 0.0.
///
/// # Examples
///
/// ```
/// use stick_cal::calibration::{trigger_travel, CalibrationParameters, Side};
///
/// let mut params = CalibrationParameters::default();
/// params.left_trigger = [100, 600];
/// assert_eq!(trigger_travel(&params, Side::Left, 350), 0.5);
/// assert_eq!(trigger_travel(&params, Side::Left, 50), 0.0);
/// assert_eq!(trigger_travel(&params, Side::Left, 900), 1.0);
/// ```
#[must_use]
pub fn trigger_travel(params: &CalibrationParameters, side: Side, raw: u16) -> f32 {
    let [min, max] = params.trigger(side);
    if max <= min {
        return 0.0;
    }

    let travel = (raw as f32 - min as f32) / (max as f32 - min as f32);
    travel.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: f32 = 2048.0;

    fn uniform_params(radius: u16) -> CalibrationParameters {
        let mut params = CalibrationParameters::default();
        params.left_radius = [radius; SECTOR_COUNT];
        params.right_radius = [radius; SECTOR_COUNT];
        params
    }

    /// Raw sample at `distance` from the default center, at `angle` from +Y.
    fn raw_at(angle: f32, distance: f32) -> Vector2 {
        Vector2::new(CENTER + distance * angle.sin(), CENTER + distance * angle.cos())
    }

    // ==================== Angle Tests ====================

    #[test]
    fn test_angle_of_axes() {
        assert!((stick_angle(Vector2::new(0.0, 1.0)) - 0.0).abs() < 1e-6);
        assert!((stick_angle(Vector2::new(1.0, 0.0)) - PI / 2.0).abs() < 1e-6);
        assert!((stick_angle(Vector2::new(0.0, -1.0)) - PI).abs() < 1e-6);
        assert!((stick_angle(Vector2::new(-1.0, 0.0)) - 3.0 * PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_is_scale_invariant() {
        let a = stick_angle(Vector2::new(3.0, 4.0));
        let b = stick_angle(Vector2::new(300.0, 400.0));
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_angle_of_zero_vector_is_nan() {
        assert!(stick_angle(Vector2::ZERO).is_nan());
    }

    // ==================== Sector Tests ====================

    #[test]
    fn test_zero_and_full_turn_share_sector() {
        assert_eq!(nearest_sector(0.0, 0.1), Some(0));
        assert_eq!(nearest_sector(2.0 * PI, 0.1), Some(0));
    }

    #[test]
    fn test_sector_centers_map_to_distinct_sectors() {
        let mut seen = [false; SECTOR_COUNT];
        for k in 0..SECTOR_COUNT {
            let sector = nearest_sector(k as f32 * SECTOR_WIDTH, 0.1).unwrap();
            assert_eq!(sector, k);
            assert!(!seen[sector], "sector {} hit twice", sector);
            seen[sector] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_adjacent_sectors_one_width_apart() {
        let a = nearest_sector(10.0 * SECTOR_WIDTH, 0.1).unwrap();
        let b = nearest_sector(11.0 * SECTOR_WIDTH, 0.1).unwrap();
        assert_eq!(b, (a + 1) % SECTOR_COUNT);

        let last = nearest_sector(59.0 * SECTOR_WIDTH, 0.1).unwrap();
        let wrapped = nearest_sector(60.0 * SECTOR_WIDTH, 0.1).unwrap();
        assert_eq!(last, 59);
        assert_eq!(wrapped, 0);
    }

    #[test]
    fn test_off_center_angle_is_rejected() {
        assert_eq!(nearest_sector(4.5 * SECTOR_WIDTH, 0.1), None);
        assert_eq!(nearest_sector(4.15 * SECTOR_WIDTH, 0.1), None);
        assert_eq!(nearest_sector(4.05 * SECTOR_WIDTH, 0.1), Some(4));
        assert_eq!(nearest_sector(3.95 * SECTOR_WIDTH, 0.1), Some(4));
    }

    #[test]
    fn test_nan_angle_has_no_sector() {
        assert_eq!(nearest_sector(f32::NAN, 0.1), None);
    }

    // ==================== Interpolation Tests ====================

    #[test]
    fn test_interpolation_on_sector_center_uses_that_sector() {
        let mut table = [1000u16; SECTOR_COUNT];
        table[5] = 1800;
        assert_eq!(interpolated_radius(&table, 5.0), 1800.0);
    }

    #[test]
    fn test_interpolation_between_sectors_is_linear() {
        let mut table = [1000u16; SECTOR_COUNT];
        table[5] = 1000;
        table[6] = 2000;
        assert!((interpolated_radius(&table, 5.25) - 1250.0).abs() < 0.01);
        assert!((interpolated_radius(&table, 5.5) - 1500.0).abs() < 0.01);
    }

    #[test]
    fn test_interpolation_wraps_past_last_sector() {
        let mut table = [1000u16; SECTOR_COUNT];
        table[59] = 1200;
        table[0] = 1600;
        assert!((interpolated_radius(&table, 59.5) - 1400.0).abs() < 0.01);
        assert_eq!(interpolated_radius(&table, 60.0), 1600.0);
    }

    #[test]
    fn test_correction_is_continuous_across_sector_boundaries() {
        let mut params = CalibrationParameters::default();
        for (i, r) in params.left_radius.iter_mut().enumerate() {
            *r = 1000 + ((i * 37) % 500) as u16;
        }
        let tuning = Tuning::default();

        let steps = SECTOR_COUNT * 50;
        let step = 2.0 * PI / steps as f32;
        let mut previous = correct_stick(&params, Side::Left, raw_at(0.0, 500.0), &tuning);

        for i in 1..=steps {
            let out = correct_stick(&params, Side::Left, raw_at(i as f32 * step, 500.0), &tuning);
            let jump = Vector2::new(out.x - previous.x, out.y - previous.y).magnitude();
            assert!(jump < 300.0, "jump of {} at step {}", jump, i);
            previous = out;
        }
    }

    #[test]
    fn test_correction_matches_on_both_sides_of_boundary() {
        let mut params = CalibrationParameters::default();
        for (i, r) in params.left_radius.iter_mut().enumerate() {
            *r = if i % 2 == 0 { 1000 } else { 1900 };
        }
        let tuning = Tuning::default();

        for k in [1usize, 17, 44, 59] {
            let boundary = k as f32 * SECTOR_WIDTH;
            let below = correct_stick(&params, Side::Left, raw_at(boundary - 1e-4, 600.0), &tuning);
            let above = correct_stick(&params, Side::Left, raw_at(boundary + 1e-4, 600.0), &tuning);
            assert!((below.x - above.x).abs() < 50.0, "x discontinuity at sector {}", k);
            assert!((below.y - above.y).abs() < 50.0, "y discontinuity at sector {}", k);
        }
    }

    #[test]
    fn test_correction_continuous_across_full_turn() {
        let mut params = CalibrationParameters::default();
        params.left_radius = [1500; SECTOR_COUNT];
        params.left_radius[0] = 1100;
        params.left_radius[59] = 1900;
        let tuning = Tuning::default();

        let before = correct_stick(&params, Side::Left, raw_at(2.0 * PI - 1e-4, 600.0), &tuning);
        let after = correct_stick(&params, Side::Left, raw_at(1e-4, 600.0), &tuning);
        assert!((before.y - after.y).abs() < 50.0);
    }

    // ==================== Correction Tests ====================

    #[test]
    fn test_rest_position_is_zero() {
        let params = CalibrationParameters::default();
        let out = correct_stick(&params, Side::Right, Vector2::new(CENTER, CENTER), &Tuning::default());
        assert_eq!(out, Vector2::ZERO);
    }

    #[test]
    fn test_uses_center_of_requested_side() {
        let mut params = uniform_params(1000);
        params.set_center(Side::Right, 1900, 2100);

        let out = correct_stick(&params, Side::Right, Vector2::new(1900.0, 2600.0), &Tuning::default());
        assert!(out.x.abs() < 0.01);
        assert!((out.y - 16500.0).abs() < 0.5);

        // The left stick still uses its own center
        let out = correct_stick(&params, Side::Left, Vector2::new(1900.0, 2600.0), &Tuning::default());
        assert!(out.x < 0.0);
    }

    #[test]
    fn test_normalizes_per_direction() {
        let mut params = uniform_params(1000);
        params.left_radius[30] = 2000;
        let tuning = Tuning::default();

        let up = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER + 500.0), &tuning);
        let down = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER - 500.0), &tuning);
        assert!((up.y - 16500.0).abs() < 0.5);
        assert!((down.y + 8250.0).abs() < 0.5);
    }

    #[test]
    fn test_dead_zone_boundary() {
        let params = uniform_params(10000);
        let tuning = Tuning::default();

        let inside = 0.0069f32.sqrt() * 10000.0;
        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER + inside), &tuning);
        assert_eq!(out, Vector2::ZERO);

        let outside = 0.0071f32.sqrt() * 10000.0;
        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER + outside), &tuning);
        assert_eq!(out.x, 0.0);
        assert!((out.y - 0.0071f32.sqrt() * 33000.0).abs() < 1.0);
    }

    #[test]
    fn test_clamp_boundary_positive_and_negative() {
        let params = uniform_params(1000);
        let tuning = Tuning::default();
        // 40000 / 33000 of the radius scales to 40000 before clamping
        let over = 1000.0 * 40000.0 / 33000.0;

        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER + over), &tuning);
        assert_eq!(out.y, 32767.0);

        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER - over), &tuning);
        assert_eq!(out.y, -32767.0);

        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER + over, CENTER), &tuning);
        assert_eq!(out.x, 32767.0);

        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER - over, CENTER), &tuning);
        assert_eq!(out.x, -32767.0);
    }

    #[test]
    fn test_axes_clamp_independently() {
        let params = uniform_params(1000);
        let tuning = Tuning::default();

        // Diagonal at 1.5x radius: both axes exceed the limit on their own
        let d = 1500.0 / 2f32.sqrt();
        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER + d, CENTER - d), &tuning);
        assert_eq!(out.x, 32767.0);
        assert_eq!(out.y, -32767.0);
    }

    #[test]
    fn test_unfound_sectors_yield_zero() {
        let params = uniform_params(0);
        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER + 900.0, CENTER), &Tuning::default());
        assert_eq!(out, Vector2::ZERO);
    }

    #[test]
    fn test_custom_tuning_is_honored() {
        let params = uniform_params(1000);
        let tuning = Tuning {
            output_gain: 100.0,
            output_limit: 80.0,
            ..Tuning::default()
        };

        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER + 500.0), &tuning);
        assert!((out.y - 50.0).abs() < 0.01);

        let out = correct_stick(&params, Side::Left, Vector2::new(CENTER, CENTER + 1000.0), &tuning);
        assert_eq!(out.y, 80.0);
    }

    // ==================== Trigger Tests ====================

    #[test]
    fn test_trigger_travel_default_range() {
        let params = CalibrationParameters::default();
        assert_eq!(trigger_travel(&params, Side::Right, 0), 0.0);
        assert!((trigger_travel(&params, Side::Right, 2048) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_trigger_travel_inverted_range_is_zero() {
        let mut params = CalibrationParameters::default();
        params.right_trigger = [700, 0];
        assert_eq!(trigger_travel(&params, Side::Right, 600), 0.0);
    }
}
