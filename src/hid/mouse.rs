//! Mouse report handed to the host with vertical and horizontal scroll.
//!
//! Fields, in the host's report order:
//! ```text
//! Byte 0: Button bitfield
//!         Bit 0 = Left, Bit 1 = Right, Bit 2 = Middle
//! Byte 1: X displacement (signed, -127..127)
//! Byte 2: Y displacement (signed, -127..127)
//! Byte 3: Vertical wheel   (signed, -127..127)
//! Byte 4: Horizontal pan   (signed, -127..127)
//! ```

/// Bounds of every relative field in the report.
pub const HID_MIN: i32 = -127;
pub const HID_MAX: i32 = 127;

/// Saturate a value into the HID relative range.
pub fn constrain_hid(value: i32) -> i8 {
    value.clamp(HID_MIN, HID_MAX) as i8
}

/// Mouse report produced by the pointing processor.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Relative X movement (signed).
    pub x: i8,
    /// Relative Y movement (signed).
    pub y: i8,
    /// Vertical scroll delta (signed).
    pub v: i8,
    /// Horizontal scroll delta (signed).
    pub h: i8,
}

impl MouseReport {
    /// Create an idle (no movement, no buttons) report.
    pub const fn empty() -> Self {
        Self {
            buttons: 0,
            x: 0,
            y: 0,
            v: 0,
            h: 0,
        }
    }

    /// Returns `true` when the report carries any cursor or scroll motion.
    pub fn has_motion(&self) -> bool {
        self.x != 0 || self.y != 0 || self.h != 0 || self.v != 0
    }
}
