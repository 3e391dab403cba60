//! Last key press, as shown on the OLED.

use core::fmt::Write;

use crate::keycode::tap_keycode;

/// Printable names of the basic keycodes below 60.
const CODE_TO_NAME: [u8; 60] = *b"    abcdefghijklmnopqrstuvwxyz1234567890REBT_-=[]\\#;'`,./   ";

/// Text of a single keylog field.
pub type KeylogField = heapless::String<8>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keylog {
    pub row: u8,
    pub col: u8,
    pub keycode: u16,
    pub name: char,
    /// False until the first press.
    pub valid: bool,
}

impl Keylog {
    pub const fn new() -> Self {
        Self {
            row: 0,
            col: 0,
            keycode: 0,
            name: ' ',
            valid: false,
        }
    }

    /// Record a press. Tap keycodes are logged as the tapped key.
    pub fn record(&mut self, keycode: u16, row: u8, col: u8) {
        let keycode = tap_keycode(keycode);
        self.row = row;
        self.col = col;
        self.keycode = keycode;
        self.name = key_name(keycode);
        self.valid = true;
    }

    pub fn row_str(&self) -> KeylogField {
        self.field(|s| write!(s, "{:<3}", self.row))
    }

    pub fn col_str(&self) -> KeylogField {
        self.field(|s| write!(s, "{:<3}", self.col))
    }

    /// Keycode as 4 hex digits.
    pub fn hex_str(&self) -> KeylogField {
        self.field(|s| write!(s, "{:04x}", self.keycode))
    }

    pub fn name_str(&self) -> KeylogField {
        self.field(|s| s.write_char(self.name))
    }

    fn field(&self, f: impl FnOnce(&mut KeylogField) -> core::fmt::Result) -> KeylogField {
        let mut s = KeylogField::new();
        if self.valid {
            let _ = f(&mut s);
        }
        s
    }
}

/// Printable name of a basic keycode, blank for anything else.
pub fn key_name(keycode: u16) -> char {
    CODE_TO_NAME
        .get(keycode as usize)
        .map_or(' ', |&b| b as char)
}
