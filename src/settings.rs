//! Runtime configuration of the trackball and auto mouse layer.
//!
//! Every setter clamps into its documented range and none of them touch
//! storage; persisting is a separate step driven by [`crate::storage`].

use crate::config::{
    SensorSpec, AUTO_MOUSE_TIME, AUTO_MOUSE_TIME_OUT_MAX, AUTO_MOUSE_TIME_OUT_MIN, CPI_DEFAULT,
    MOTION_RESET_MS, OLED_ORIENT_DEFAULT, SCROLL_DIV_DEFAULT, SCROLL_DIV_MAX, SCROLL_DIV_MIN,
    SPEED_ADJUST_DEFAULT, SPEED_ADJUST_MAX, SPEED_ADJUST_MIN,
};
use crate::time::timer_elapsed;

/// Axis restriction applied to scroll output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScrollSnapMode {
    /// Vertical scroll only.
    #[default]
    Vertical = 0,
    /// Horizontal scroll only.
    Horizontal = 1,
    /// Both axes.
    Free = 2,
}

impl ScrollSnapMode {
    /// Decode a raw mode, normalizing unknown values to `Vertical`.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ScrollSnapMode::Horizontal,
            2 => ScrollSnapMode::Free,
            _ => ScrollSnapMode::Vertical,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short label shown on the OLED.
    pub fn label(self) -> &'static str {
        match self {
            ScrollSnapMode::Vertical => "VER",
            ScrollSnapMode::Horizontal => "HOR",
            ScrollSnapMode::Free => "FRE",
        }
    }
}

/// Recently reported motion, used for the auto mouse timeout and the OLED.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    /// Sum of reported X since the last reset.
    pub x: i32,
    /// Sum of reported Y since the last reset.
    pub y: i32,
    /// Tick (ms) of the last report carrying motion.
    pub active_time: u32,
}

impl Motion {
    /// Fold a report's deltas in, clearing stale motion first.
    pub fn track(&mut self, dx: i8, dy: i8, moved: bool, now: u32) {
        if timer_elapsed(now, self.active_time) > MOTION_RESET_MS {
            self.x = 0;
            self.y = 0;
            self.active_time = now;
        }
        if moved {
            self.active_time = now;
        }
        self.x = self.x.saturating_add(dx as i32);
        self.y = self.y.saturating_add(dy as i32);
    }

    /// Motion magnitude shown on the OLED.
    pub fn magnitude(&self) -> u32 {
        self.x.unsigned_abs().saturating_add(self.y.unsigned_abs())
    }
}

/// Live keyboard configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct MtkConfig {
    sensor: SensorSpec,
    cpi: u16,
    cpi_changed: bool,
    scroll_mode: bool,
    scroll_direction: bool,
    scroll_div: u8,
    scroll_snap_mode: ScrollSnapMode,
    auto_mouse_mode: bool,
    auto_mouse_time_out: u16,
    speed_adjust_enabled: bool,
    speed_adjust_value: u8,
    oled_orient: u8,
    /// Recently reported motion.
    pub motion: Motion,
    /// Momentary scroll key is held.
    pub key_pressed: bool,
}

impl MtkConfig {
    /// Configuration with every field at its default.
    pub const fn new(sensor: SensorSpec) -> Self {
        Self {
            sensor,
            cpi: CPI_DEFAULT,
            cpi_changed: false,
            scroll_mode: false,
            scroll_direction: false,
            scroll_div: SCROLL_DIV_DEFAULT,
            scroll_snap_mode: ScrollSnapMode::Vertical,
            auto_mouse_mode: true,
            auto_mouse_time_out: AUTO_MOUSE_TIME,
            speed_adjust_enabled: true,
            speed_adjust_value: SPEED_ADJUST_DEFAULT,
            oled_orient: OLED_ORIENT_DEFAULT,
            motion: Motion {
                x: 0,
                y: 0,
                active_time: 0,
            },
            key_pressed: false,
        }
    }

    /// Put every tunable back to its default, keeping the fitted sensor.
    pub fn reset_to_defaults(&mut self) {
        *self = Self::new(self.sensor);
    }

    pub fn sensor(&self) -> SensorSpec {
        self.sensor
    }

    // CPI

    pub fn cpi(&self) -> u16 {
        if self.cpi == 0 {
            CPI_DEFAULT
        } else {
            self.cpi
        }
    }

    pub fn set_cpi(&mut self, cpi: u16) {
        self.cpi = cpi.clamp(self.sensor.cpi_floor(), self.sensor.cpi_max);
        self.cpi_changed = true;
    }

    pub fn add_cpi(&mut self, delta: i32) {
        let v = (self.cpi() as i32).saturating_add(delta).clamp(1, u16::MAX as i32);
        self.set_cpi(v as u16);
    }

    /// Returns the CPI to push to the sensor if it changed since the last call.
    pub fn take_cpi_changed(&mut self) -> Option<u16> {
        if self.cpi_changed {
            self.cpi_changed = false;
            Some(self.cpi())
        } else {
            None
        }
    }

    // Scroll

    pub fn scroll_mode(&self) -> bool {
        self.scroll_mode
    }

    pub fn set_scroll_mode(&mut self, mode: bool) {
        self.scroll_mode = mode;
    }

    pub fn scroll_direction(&self) -> bool {
        self.scroll_direction
    }

    pub fn set_scroll_direction(&mut self, direction: bool) {
        self.scroll_direction = direction;
    }

    pub fn scroll_div(&self) -> u8 {
        if self.scroll_div == 0 {
            SCROLL_DIV_DEFAULT
        } else {
            self.scroll_div
        }
    }

    pub fn set_scroll_div(&mut self, div: u8) {
        self.scroll_div = div.clamp(SCROLL_DIV_MIN, SCROLL_DIV_MAX);
    }

    pub fn add_scroll_div(&mut self, delta: i32) {
        let v = (self.scroll_div() as i32).saturating_add(delta);
        self.set_scroll_div(v.clamp(0, u8::MAX as i32) as u8);
    }

    pub fn scroll_snap_mode(&self) -> ScrollSnapMode {
        self.scroll_snap_mode
    }

    /// Set the snap mode from its raw value; unknown values select `Vertical`.
    pub fn set_scroll_snap_mode(&mut self, raw: u8) {
        self.scroll_snap_mode = ScrollSnapMode::from_u8(raw);
    }

    // Auto mouse

    pub fn auto_mouse_mode(&self) -> bool {
        self.auto_mouse_mode
    }

    pub fn set_auto_mouse_mode(&mut self, mode: bool) {
        self.auto_mouse_mode = mode;
    }

    pub fn auto_mouse_time_out(&self) -> u16 {
        self.auto_mouse_time_out
    }

    pub fn set_auto_mouse_time_out(&mut self, timeout: u16) {
        self.auto_mouse_time_out = timeout.clamp(AUTO_MOUSE_TIME_OUT_MIN, AUTO_MOUSE_TIME_OUT_MAX);
    }

    pub fn add_auto_mouse_time_out(&mut self, delta: i32) {
        let v = (self.auto_mouse_time_out as i32).saturating_add(delta);
        self.set_auto_mouse_time_out(v.clamp(0, u16::MAX as i32) as u16);
    }

    // Speed adjust

    pub fn speed_adjust_enabled(&self) -> bool {
        self.speed_adjust_enabled
    }

    pub fn set_speed_adjust_enabled(&mut self, enabled: bool) {
        self.speed_adjust_enabled = enabled;
    }

    pub fn speed_adjust_value(&self) -> u8 {
        self.speed_adjust_value
    }

    pub fn set_speed_adjust_value(&mut self, value: u8) {
        self.speed_adjust_value = value.clamp(SPEED_ADJUST_MIN, SPEED_ADJUST_MAX);
    }

    pub fn add_speed_adjust_value(&mut self, delta: i32) {
        let v = (self.speed_adjust_value as i32).saturating_add(delta);
        self.set_speed_adjust_value(v.clamp(0, u8::MAX as i32) as u8);
    }

    // OLED

    pub fn oled_orient(&self) -> u8 {
        self.oled_orient
    }

    /// Any non-zero value selects portrait.
    pub fn set_oled_orient(&mut self, value: u8) {
        self.oled_orient = if value != 0 { 1 } else { 0 };
    }
}

impl Default for MtkConfig {
    fn default() -> Self {
        Self::new(crate::config::PMW3389)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PMW3360, PMW3389};

    #[test]
    fn defaults_match_documented_constants() {
        let c = MtkConfig::default();
        assert_eq!(c.cpi(), CPI_DEFAULT);
        assert_eq!(c.scroll_div(), SCROLL_DIV_DEFAULT);
        assert_eq!(c.scroll_snap_mode(), ScrollSnapMode::Vertical);
        assert_eq!(c.oled_orient(), OLED_ORIENT_DEFAULT);
        assert_eq!(c.speed_adjust_value(), SPEED_ADJUST_DEFAULT);
        assert_eq!(c.auto_mouse_time_out(), AUTO_MOUSE_TIME);
        assert!(c.auto_mouse_mode());
        assert!(c.speed_adjust_enabled());
        assert!(!c.scroll_mode());
        assert!(!c.scroll_direction());
    }

    #[test]
    fn set_cpi_clamps_to_sensor_range() {
        let mut c = MtkConfig::new(PMW3389);
        for (input, expected) in [(0, 100), (99, 100), (100, 100), (1234, 1234), (16000, 16000), (16001, 16000), (u16::MAX, 16000)] {
            c.set_cpi(input);
            assert_eq!(c.cpi(), expected, "set_cpi({input})");
        }

        let mut c = MtkConfig::new(PMW3360);
        c.set_cpi(50);
        assert_eq!(c.cpi(), 200);
        c.set_cpi(20000);
        assert_eq!(c.cpi(), 12000);
    }

    #[test]
    fn add_cpi_goes_through_setter() {
        let mut c = MtkConfig::default();
        c.add_cpi(-1000);
        assert_eq!(c.cpi(), 100);
        c.add_cpi(-1000);
        assert_eq!(c.cpi(), 100);
        c.add_cpi(100_000);
        assert_eq!(c.cpi(), 16000);
    }

    #[test]
    fn cpi_change_is_reported_once() {
        let mut c = MtkConfig::default();
        assert_eq!(c.take_cpi_changed(), None);
        c.add_cpi(10);
        assert_eq!(c.take_cpi_changed(), Some(1010));
        assert_eq!(c.take_cpi_changed(), None);
    }

    #[test]
    fn scroll_div_is_clamped_and_never_zero() {
        let mut c = MtkConfig::default();
        for v in 0..=u8::MAX {
            c.set_scroll_div(v);
            assert_eq!(c.scroll_div(), v.clamp(SCROLL_DIV_MIN, SCROLL_DIV_MAX));
            assert_ne!(c.scroll_div(), 0);
        }
        c.set_scroll_div(1);
        c.add_scroll_div(-1);
        assert_eq!(c.scroll_div(), 1);
        c.set_scroll_div(32);
        c.add_scroll_div(1);
        assert_eq!(c.scroll_div(), 32);
    }

    #[test]
    fn auto_mouse_time_out_bounds() {
        let mut c = MtkConfig::default();
        c.set_auto_mouse_time_out(0);
        assert_eq!(c.auto_mouse_time_out(), 100);
        c.add_auto_mouse_time_out(-50);
        assert_eq!(c.auto_mouse_time_out(), 100);
        c.add_auto_mouse_time_out(50);
        assert_eq!(c.auto_mouse_time_out(), 150);
        c.set_auto_mouse_time_out(u16::MAX);
        assert_eq!(c.auto_mouse_time_out(), AUTO_MOUSE_TIME_OUT_MAX);
    }

    #[test]
    fn speed_adjust_bounds() {
        let mut c = MtkConfig::default();
        c.set_speed_adjust_value(0);
        assert_eq!(c.speed_adjust_value(), SPEED_ADJUST_MIN);
        c.add_speed_adjust_value(-1);
        assert_eq!(c.speed_adjust_value(), SPEED_ADJUST_MIN);
        c.set_speed_adjust_value(200);
        assert_eq!(c.speed_adjust_value(), SPEED_ADJUST_MAX);
        c.add_speed_adjust_value(1);
        assert_eq!(c.speed_adjust_value(), SPEED_ADJUST_MAX);
        c.add_speed_adjust_value(-5);
        assert_eq!(c.speed_adjust_value(), 15);
    }

    #[test]
    fn invalid_snap_mode_normalizes_to_vertical() {
        let mut c = MtkConfig::default();
        c.set_scroll_snap_mode(2);
        assert_eq!(c.scroll_snap_mode(), ScrollSnapMode::Free);
        c.set_scroll_snap_mode(3);
        assert_eq!(c.scroll_snap_mode(), ScrollSnapMode::Vertical);
        c.set_scroll_snap_mode(0xFF);
        assert_eq!(c.scroll_snap_mode(), ScrollSnapMode::Vertical);
    }

    #[test]
    fn oled_orient_is_boolean() {
        let mut c = MtkConfig::default();
        c.set_oled_orient(0);
        assert_eq!(c.oled_orient(), 0);
        c.set_oled_orient(7);
        assert_eq!(c.oled_orient(), 1);
    }

    #[test]
    fn motion_resets_after_inactivity() {
        let mut m = Motion::default();
        m.track(3, -4, true, 1000);
        m.track(2, 0, true, 1100);
        assert_eq!((m.x, m.y), (5, -4));
        assert_eq!(m.magnitude(), 9);

        // Idle tick within the window keeps the sums.
        m.track(0, 0, false, 1300);
        assert_eq!((m.x, m.y, m.active_time), (5, -4, 1100));

        // 401 ms after the last motion the sums are cleared first.
        m.track(1, 1, true, 1501);
        assert_eq!((m.x, m.y, m.active_time), (1, 1, 1501));
    }
}
