//! Persistence of the keyboard configuration.
//!
//! The keyboard owns an 8-byte block at [`EECONFIG_KB_ADDR`] in the host's
//! byte-addressable EEPROM. Record layout (byte i = field i):
//!
//! ```text
//! 0  speed_adjust_value   tenths, 8..=20
//! 1  cpi                  sensor step units
//! 2  scroll_div
//! 3  auto_mouse_time_out  100 ms units
//! 4  auto_mouse           0 / 1
//! 5  scroll_snap_mode     0 = VER, 1 = HOR, 2 = FRE
//! 6  scroll_direction     0 / 1
//! 7  oled_orient          0 / 1
//! ```
//!
//! The block reads back as a little-endian `u64`, which keeps records written
//! by older firmware compatible.

#[cfg(feature = "embedded")]
pub mod flash;

use crate::config::{SensorSpec, AUTO_MOUSE_TIME_OUT_UNIT, EECONFIG_KB_ADDR};
use crate::settings::MtkConfig;

/// Size of the persisted record in bytes.
pub const EE_CONFIG_SIZE: usize = 8;

/// Byte-level non-volatile storage provided by the host firmware.
pub trait KbEeprom {
    fn read_byte(&self, addr: u16) -> u8;

    /// Write `value` at `addr`, skipping the write when the byte already matches.
    fn update_byte(&mut self, addr: u16, value: u8);
}

/// EEPROM held in RAM. Used on the host and in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RamEeprom<const N: usize> {
    bytes: [u8; N],
    writes: usize,
}

impl<const N: usize> RamEeprom<N> {
    /// Zero-filled, as on a board that has never been configured.
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            writes: 0,
        }
    }

    /// Filled with 0xFF, as after a flash erase.
    pub const fn erased() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes actually changed by `update_byte`.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl<const N: usize> Default for RamEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> KbEeprom for RamEeprom<N> {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }

    fn update_byte(&mut self, addr: u16, value: u8) {
        match self.bytes.get_mut(addr as usize) {
            Some(b) if *b != value => {
                *b = value;
                self.writes += 1;
            }
            Some(_) => {}
            None => warn!("EEPROM write past end: {}", addr),
        }
    }
}

/// Read the keyboard block as a little-endian `u64`.
pub fn read_kb_64(eeprom: &impl KbEeprom) -> u64 {
    (0..EE_CONFIG_SIZE as u16).fold(0u64, |acc, i| {
        acc | (eeprom.read_byte(EECONFIG_KB_ADDR + i) as u64) << (i * 8)
    })
}

/// Write the keyboard block byte by byte.
pub fn update_kb_64(eeprom: &mut impl KbEeprom, value: u64) {
    for (i, b) in value.to_le_bytes().iter().enumerate() {
        eeprom.update_byte(EECONFIG_KB_ADDR + i as u16, *b);
    }
}

/// The persisted record, one byte per field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EeConfig {
    pub speed_adjust_value: u8,
    pub cpi: u8,
    pub scroll_div: u8,
    pub auto_mouse_time_out: u8,
    pub auto_mouse: u8,
    pub scroll_snap_mode: u8,
    pub scroll_direction: u8,
    pub oled_orient: u8,
}

impl EeConfig {
    pub fn from_bytes(b: [u8; EE_CONFIG_SIZE]) -> Self {
        Self {
            speed_adjust_value: b[0],
            cpi: b[1],
            scroll_div: b[2],
            auto_mouse_time_out: b[3],
            auto_mouse: b[4],
            scroll_snap_mode: b[5],
            scroll_direction: b[6],
            oled_orient: b[7],
        }
    }

    pub fn to_bytes(&self) -> [u8; EE_CONFIG_SIZE] {
        [
            self.speed_adjust_value,
            self.cpi,
            self.scroll_div,
            self.auto_mouse_time_out,
            self.auto_mouse,
            self.scroll_snap_mode,
            self.scroll_direction,
            self.oled_orient,
        ]
    }

    pub fn from_raw(raw: u64) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }

    pub fn raw(&self) -> u64 {
        u64::from_le_bytes(self.to_bytes())
    }

    /// Pack the persisted fields of a live configuration.
    ///
    /// CPI and timeout are truncated to their storage units and saturate at 255.
    pub fn from_config(config: &MtkConfig) -> Self {
        let step = config.sensor().cpi_step.max(1);
        Self {
            speed_adjust_value: config.speed_adjust_value(),
            cpi: (config.cpi() / step).min(u8::MAX as u16) as u8,
            scroll_div: config.scroll_div(),
            auto_mouse_time_out: (config.auto_mouse_time_out() / AUTO_MOUSE_TIME_OUT_UNIT)
                .min(u8::MAX as u16) as u8,
            auto_mouse: config.auto_mouse_mode() as u8,
            scroll_snap_mode: config.scroll_snap_mode().as_u8(),
            scroll_direction: config.scroll_direction() as u8,
            oled_orient: config.oled_orient(),
        }
    }

    /// Apply every field through the clamping setters.
    pub fn apply(&self, config: &mut MtkConfig) {
        let step = config.sensor().cpi_step;
        config.set_cpi((self.cpi as u16).saturating_mul(step));
        config.set_scroll_direction(self.scroll_direction != 0);
        config.set_scroll_div(self.scroll_div);
        config.set_auto_mouse_mode(self.auto_mouse != 0);
        config.set_auto_mouse_time_out(
            (self.auto_mouse_time_out as u16).saturating_mul(AUTO_MOUSE_TIME_OUT_UNIT),
        );
        config.set_scroll_snap_mode(self.scroll_snap_mode);
        config.set_speed_adjust_value(self.speed_adjust_value);
        config.set_oled_orient(self.oled_orient);
    }

    /// A never-written block reads all zero; an erased one all 0xFF.
    pub fn is_uninitialized(&self) -> bool {
        let raw = self.raw();
        raw == 0 || raw == u64::MAX
    }

    /// Stored CPI beyond what the sensor supports means the record is from
    /// another layout or sensor and cannot be trusted.
    pub fn is_runaway(&self, sensor: &SensorSpec) -> bool {
        self.cpi as u32 * sensor.cpi_step as u32 > sensor.cpi_max as u32
    }
}

/// How [`restore`] brought the configuration up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Restore {
    /// The stored record was applied.
    Loaded,
    /// No record existed; defaults were written.
    Initialized,
    /// The record held an impossible CPI; defaults were written.
    Recovered,
}

/// Read the record and apply it to `config`.
pub fn load(config: &mut MtkConfig, eeprom: &impl KbEeprom) -> EeConfig {
    let record = EeConfig::from_raw(read_kb_64(eeprom));
    record.apply(config);
    debug!("Loaded keyboard config: {:?}", record);
    record
}

/// Pack `config` and write it to the keyboard block.
pub fn save(config: &MtkConfig, eeprom: &mut impl KbEeprom) {
    let record = EeConfig::from_config(config);
    update_kb_64(eeprom, record.raw());
    info!("Saved keyboard config: {:?}", record);
}

/// Reset `config` to defaults, write them once and read them back.
pub fn init_defaults(config: &mut MtkConfig, eeprom: &mut impl KbEeprom) {
    config.reset_to_defaults();
    save(config, eeprom);
    load(config, eeprom);
}

/// Boot-time restore: load the record, or rewrite defaults when it is
/// missing or corrupt.
pub fn restore(config: &mut MtkConfig, eeprom: &mut impl KbEeprom) -> Restore {
    let stored = EeConfig::from_raw(read_kb_64(eeprom));
    if stored.is_uninitialized() {
        info!("No keyboard config stored, writing defaults");
        init_defaults(config, eeprom);
        return Restore::Initialized;
    }
    if stored.is_runaway(&config.sensor()) {
        warn!("Stored CPI step {} exceeds sensor range, resetting config", stored.cpi);
        init_defaults(config, eeprom);
        return Restore::Recovered;
    }
    load(config, eeprom);
    Restore::Loaded
}
