//! Trackball acceleration curve.
//!
//! Each axis follows a power law anchored at `cpi / 20` counts:
//!
//! ```text
//! out = |d|^k / (cpi/20)^k * (cpi/20)      k = speed_adjust / 10
//! ```
//!
//! so a delta of exactly `cpi / 20` passes through unchanged, smaller deltas
//! are damped and larger ones accelerated.

use crate::config::{XSCALE_FACTOR, YSCALE_FACTOR};
use crate::hid::{constrain_hid, MouseReport};

/// Curve output for one axis before rounding.
pub fn accelerate(delta: i32, speed_adjust: u8, cpi: u16) -> f32 {
    if delta == 0 {
        return 0.0;
    }
    let k = speed_adjust as f32 / 10.0;
    // Integer anchor as the sensor firmware computes it; never zero.
    let anchor = (cpi / 20).max(1) as f32;
    let magnitude = libm::powf(delta.unsigned_abs() as f32, k) / libm::powf(anchor, k) * (cpi as f32 / 20.0);
    if delta < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Add the accelerated `(dx, dy)` to `report`, saturating at the HID bounds.
pub fn motion_to_mouse(report: &mut MouseReport, dx: i16, dy: i16, speed_adjust: u8, cpi: u16) {
    let x = accelerate(dx as i32, speed_adjust, cpi) / XSCALE_FACTOR;
    let y = accelerate(dy as i32, speed_adjust, cpi) / YSCALE_FACTOR;

    report.x = constrain_hid((report.x as i32).saturating_add(libm::roundf(x) as i32));
    report.y = constrain_hid((report.y as i32).saturating_add(libm::roundf(y) as i32));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(dx: i16, dy: i16, speed_adjust: u8, cpi: u16) -> (i8, i8) {
        let mut report = MouseReport::empty();
        motion_to_mouse(&mut report, dx, dy, speed_adjust, cpi);
        (report.x, report.y)
    }

    #[test]
    fn zero_delta_stays_zero() {
        for k in [8, 10, 15, 20] {
            for cpi in [100, 1000, 16000] {
                assert_eq!(curve(0, 0, k, cpi), (0, 0));
            }
        }
    }

    #[test]
    fn small_delta_is_damped() {
        // 10^1.5 / 50^1.5 * 50 = 4.47
        assert_eq!(curve(10, 0, 15, 1000), (4, 0));
        assert_eq!(curve(-10, 0, 15, 1000), (-4, 0));
    }

    #[test]
    fn anchor_passes_through_at_linear_exponent() {
        assert_eq!(curve(50, -50, 10, 1000), (50, -50));
        assert_eq!(curve(10, 10, 10, 200), (10, 10));
    }

    #[test]
    fn anchor_is_fixed_for_every_exponent() {
        for k in 8..=20 {
            assert_eq!(curve(25, 0, k, 500).0, 25, "k = {k}");
        }
    }

    #[test]
    fn output_saturates() {
        assert_eq!(curve(i16::MAX, i16::MIN, 20, 100), (127, -127));
        assert_eq!(curve(i16::MAX, i16::MIN, 8, 16000), (127, -127));
    }

    #[test]
    fn adds_to_existing_report() {
        let mut report = MouseReport {
            x: 120,
            y: -3,
            ..MouseReport::empty()
        };
        motion_to_mouse(&mut report, 50, 50, 10, 1000);
        assert_eq!((report.x, report.y), (127, 47));
    }

    #[test]
    fn zero_cpi_does_not_divide_by_zero() {
        assert_eq!(curve(5, 5, 15, 0), (0, 0));
    }
}
