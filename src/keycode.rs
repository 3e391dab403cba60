//! Keyboard-level keycodes.
//!
//! The custom codes occupy the keyboard range starting at `QK_KB_0` and
//! keep the order they have always had, so existing keymaps stay valid.

/// First keyboard-level keycode.
pub const QK_KB_0: u16 = 0x7E00;

/// Basic keycode with modifiers applied.
pub const QK_MODS: u16 = 0x0100;
pub const QK_MODS_MAX: u16 = 0x1FFF;

/// Mod-tap and layer-tap ranges, which carry the tapped keycode in the low byte.
pub const QK_MOD_TAP: u16 = 0x2000;
pub const QK_MOD_TAP_MAX: u16 = 0x3FFF;
pub const QK_LAYER_TAP: u16 = 0x4000;
pub const QK_LAYER_TAP_MAX: u16 = 0x4FFF;

/// Keycodes handled by the keyboard itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum CustomKeycode {
    /// Reload the stored configuration.
    KbcLoad = QK_KB_0,
    /// Persist the live configuration.
    KbcSave,
    CpiI10,
    CpiD10,
    CpiI100,
    CpiD100,
    CpiI1k,
    CpiD1k,
    /// Toggle scroll mode.
    ScrlTo,
    /// Scroll mode while held.
    ScrlMo,
    /// Invert vertical scroll.
    ScrlInv,
    ScrlDvi,
    ScrlDvd,
    /// Toggle the auto mouse layer.
    AmTg,
    AmToutInc,
    AmToutDec,
    SsnpVrt,
    SsnpHor,
    SsnpFre,
    /// Toggle the acceleration curve.
    AdjmsTg,
    AdjmsSpdInc,
    AdjmsSpdDec,
    /// Switch between landscape and portrait OLED layout.
    OledOriTg,
}

impl CustomKeycode {
    const ALL: [CustomKeycode; 23] = [
        CustomKeycode::KbcLoad,
        CustomKeycode::KbcSave,
        CustomKeycode::CpiI10,
        CustomKeycode::CpiD10,
        CustomKeycode::CpiI100,
        CustomKeycode::CpiD100,
        CustomKeycode::CpiI1k,
        CustomKeycode::CpiD1k,
        CustomKeycode::ScrlTo,
        CustomKeycode::ScrlMo,
        CustomKeycode::ScrlInv,
        CustomKeycode::ScrlDvi,
        CustomKeycode::ScrlDvd,
        CustomKeycode::AmTg,
        CustomKeycode::AmToutInc,
        CustomKeycode::AmToutDec,
        CustomKeycode::SsnpVrt,
        CustomKeycode::SsnpHor,
        CustomKeycode::SsnpFre,
        CustomKeycode::AdjmsTg,
        CustomKeycode::AdjmsSpdInc,
        CustomKeycode::AdjmsSpdDec,
        CustomKeycode::OledOriTg,
    ];

    pub fn from_u16(code: u16) -> Option<Self> {
        let index = code.checked_sub(QK_KB_0)? as usize;
        Self::ALL.get(index).copied()
    }

    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// Strip modifiers from a `QK_MODS` keycode; others pass through.
pub fn strip_mods(keycode: u16) -> u16 {
    if (QK_MODS..=QK_MODS_MAX).contains(&keycode) {
        keycode & 0xFF
    } else {
        keycode
    }
}

/// Reduce mod-tap and layer-tap keycodes to the tapped basic keycode.
pub fn tap_keycode(keycode: u16) -> u16 {
    if (QK_MOD_TAP..=QK_MOD_TAP_MAX).contains(&keycode)
        || (QK_LAYER_TAP..=QK_LAYER_TAP_MAX).contains(&keycode)
    {
        keycode & 0xFF
    } else {
        keycode
    }
}
