//! OLED user interface.
//!
//! The keyboard core produces text only; drawing is left to a backend
//! (see `display` with the `embedded` feature).
//!
//! ## Components
//!
//! - **Status**: per-row status text for the landscape, portrait and slave layouts
//! - **Keylog**: last pressed key
//! - **Animation**: sweep shown after the orientation toggle

pub mod animation;
#[cfg(feature = "embedded")]
pub mod display;
pub mod keylog;
pub mod status;

pub use animation::{AnimationFrame, AnimationPoll, OrientationAnimation};
pub use keylog::Keylog;
pub use status::{Layout, StatusLine, StatusView};

use crate::config::TYPE_COUNT_PER_INDICATOR;

/// Panel rotation requested from the host OLED driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OledRotation {
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

/// Rotation for this half.
///
/// The master follows the orientation setting (portrait is turned towards
/// the trackball); a left slave is upside down; anything else keeps the
/// host's `default`.
pub fn oled_rotation(
    is_master: bool,
    is_left: bool,
    oled_orient: u8,
    default: OledRotation,
) -> OledRotation {
    if is_master {
        match (oled_orient, is_left) {
            (0, _) => OledRotation::Rotate0,
            (_, false) => OledRotation::Rotate270,
            (_, true) => OledRotation::Rotate90,
        }
    } else if is_left {
        OledRotation::Rotate180
    } else {
        default
    }
}

/// Key press counter driving the layer 0 indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeCounter(u32);

impl TypeCounter {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn with_count(count: u32) -> Self {
        Self(count)
    }

    pub fn count(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Lit indicator cells, one per [`TYPE_COUNT_PER_INDICATOR`] presses.
    pub fn indicators(&self, width: u8) -> u8 {
        (self.0 / TYPE_COUNT_PER_INDICATOR).min(width as u32) as u8
    }
}

/// Whole minutes since boot.
pub fn uptime_minutes(now_ms: u32) -> u32 {
    now_ms / 1000 / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_rotation_follows_orientation() {
        let d = OledRotation::Rotate0;
        assert_eq!(oled_rotation(true, false, 0, d), OledRotation::Rotate0);
        assert_eq!(oled_rotation(true, true, 0, d), OledRotation::Rotate0);
        assert_eq!(oled_rotation(true, false, 1, d), OledRotation::Rotate270);
        assert_eq!(oled_rotation(true, true, 1, d), OledRotation::Rotate90);
    }

    #[test]
    fn slave_rotation() {
        let d = OledRotation::Rotate90;
        assert_eq!(oled_rotation(false, true, 1, d), OledRotation::Rotate180);
        assert_eq!(oled_rotation(false, false, 1, d), OledRotation::Rotate90);
    }

    #[test]
    fn type_counter_indicators_are_capped() {
        let mut c = TypeCounter::new();
        assert_eq!(c.indicators(10), 0);
        for _ in 0..6000 {
            c.count();
        }
        assert_eq!(c.get(), 6000);
        assert_eq!(c.indicators(10), 2);
        assert_eq!(c.indicators(1), 1);
        assert_eq!(TypeCounter::with_count(u32::MAX).indicators(15), 15);
    }

    #[test]
    fn uptime_is_whole_minutes() {
        assert_eq!(uptime_minutes(59_999), 0);
        assert_eq!(uptime_minutes(60_000), 1);
        assert_eq!(uptime_minutes(3_600_000), 60);
    }
}
