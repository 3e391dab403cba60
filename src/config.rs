//! Keyboard-level constants and compile-time configuration.
//!
//! Defaults, valid ranges and timing parameters live here so they can be
//! tuned in one place. Sensor limits are described by [`SensorSpec`] because
//! they depend on the trackball sensor fitted to the board.

// Sensor

/// Resolution limits of the trackball sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSpec {
    /// Lowest CPI the sensor accepts.
    pub cpi_min: u16,
    /// Highest CPI the sensor accepts.
    pub cpi_max: u16,
    /// CPI granularity, also the unit of the persisted CPI byte.
    pub cpi_step: u16,
}

impl SensorSpec {
    /// Lowest CPI the keyboard lets the user select (twice the sensor minimum).
    pub const fn cpi_floor(&self) -> u16 {
        self.cpi_min * 2
    }
}

/// PixArt PMW3389, the sensor shipped on the mtk64erp.
pub const PMW3389: SensorSpec = SensorSpec {
    cpi_min: 50,
    cpi_max: 16000,
    cpi_step: 50,
};

/// PixArt PMW3360.
pub const PMW3360: SensorSpec = SensorSpec {
    cpi_min: 100,
    cpi_max: 12000,
    cpi_step: 100,
};

// Pointer

/// Default trackball sensitivity.
pub const CPI_DEFAULT: u16 = 1000;

/// Final cursor scale factors applied after the acceleration curve.
/// Larger values slow the cursor down.
pub const XSCALE_FACTOR: f32 = 1.0;
pub const YSCALE_FACTOR: f32 = 1.0;

/// Speed adjust exponent in tenths (15 = 1.5).
pub const SPEED_ADJUST_DEFAULT: u8 = 15;
pub const SPEED_ADJUST_MIN: u8 = 8;
pub const SPEED_ADJUST_MAX: u8 = 20;
pub const SPEED_ADJUST_STEP: i16 = 1;

/// Accumulated motion is cleared after this much inactivity (ms).
pub const MOTION_RESET_MS: u32 = 300;

// Scroll

/// Scroll divider; the effective resolution is `scroll_div * SCROLL_DIV_UNIT` counts per step.
pub const SCROLL_DIV_DEFAULT: u8 = 10;
pub const SCROLL_DIV_MIN: u8 = 1;
pub const SCROLL_DIV_MAX: u8 = 32;
pub const SCROLL_DIV_UNIT: i32 = 8;

// Auto mouse layer

/// Layer engaged automatically while the trackball moves.
pub const AUTO_MOUSE_DEFAULT_LAYER: u8 = 7;

/// Default auto mouse timeout (ms).
pub const AUTO_MOUSE_TIME: u16 = 650;

/// The timeout is persisted in 100 ms units in a single byte.
pub const AUTO_MOUSE_TIME_OUT_UNIT: u16 = 100;
pub const AUTO_MOUSE_TIME_OUT_MIN: u16 = 100;
pub const AUTO_MOUSE_TIME_OUT_MAX: u16 = 255 * AUTO_MOUSE_TIME_OUT_UNIT;

/// Movement threshold before the auto mouse layer engages (shown on the OLED).
pub const AUTO_MOUSE_THRESHOLD: u16 = 10;

/// Number of keymap layers.
pub const LAYER_COUNT: u8 = 8;

// Key handling step sizes

pub const AUTO_MOUSE_TIME_OUT_STEP: i32 = 50;

// OLED

/// 0 = landscape, 1 = portrait.
pub const OLED_ORIENT_DEFAULT: u8 = 1;

/// Indicator width on the master (portrait) and slave OLED.
pub const OLED_WIDTH: u8 = 10;
pub const OLED_WIDTH_SLAVE: u8 = 15;

/// Status refresh period (ms).
pub const OLED_REFRESH_MS: u32 = 100;

/// Orientation toggle animation: rows swept and total duration (ms).
pub const OLED_ANIMATION_ROWS: u8 = 15;
pub const OLED_ANIMATION_TIME_MS: u32 = 3000;

/// One indicator cell lights up per this many key presses on layer 0.
pub const TYPE_COUNT_PER_INDICATOR: u32 = 3000;

// Persistent storage

/// Byte address of the keyboard-level config block in EEPROM.
pub const EECONFIG_KB_ADDR: u16 = 32;

/// Size of the emulated EEPROM region mirrored to flash.
pub const KB_EEPROM_SIZE: usize = 64;

/// Flash page index where the EEPROM emulation starts (4 KB pages).
pub const STORAGE_FLASH_PAGE_START: u32 = 248;

/// Number of flash pages reserved for the EEPROM emulation.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 2;
