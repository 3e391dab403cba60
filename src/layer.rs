//! Layer state reconciliation with the auto mouse layer.

use crate::config::AUTO_MOUSE_DEFAULT_LAYER;
use crate::settings::MtkConfig;
use crate::time::timer_elapsed;

/// Bitmask of active layers, bit n = layer n.
pub type LayerState = u32;

/// Bit of the auto mouse layer.
pub const AUTO_MOUSE_LAYER_MASK: LayerState = 1 << AUTO_MOUSE_DEFAULT_LAYER;

/// Highest active layer, 0 when no bit is set.
pub fn highest_layer(state: LayerState) -> u8 {
    if state == 0 {
        0
    } else {
        (LayerState::BITS - 1 - state.leading_zeros()) as u8
    }
}

/// Layers that suspend auto mouse switching while on top.
fn is_fixed_layer(layer: u8) -> bool {
    (1..AUTO_MOUSE_DEFAULT_LAYER).contains(&layer)
}

/// Outcome of [`layer_state_set`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerTransition {
    /// Layer state to apply.
    pub state: LayerState,
    /// Whether the host's automatic mouse layer should be armed.
    pub auto_mouse_enabled: bool,
}

/// Reconcile a new layer state with the auto mouse preference, the held
/// scroll key and the inactivity timeout.
pub fn layer_state_set(state: LayerState, config: &MtkConfig, now: u32) -> LayerTransition {
    let highest = highest_layer(state);
    let mut state = state;

    let auto_mouse_enabled = if is_fixed_layer(highest) {
        state &= !AUTO_MOUSE_LAYER_MASK;
        false
    } else {
        if !config.auto_mouse_mode() {
            state &= !AUTO_MOUSE_LAYER_MASK;
        }
        config.auto_mouse_mode()
    };

    if config.key_pressed && config.scroll_mode() {
        state = AUTO_MOUSE_LAYER_MASK;
    } else if highest == AUTO_MOUSE_DEFAULT_LAYER
        && timer_elapsed(now, config.motion.active_time) > config.auto_mouse_time_out() as u32
        && !config.key_pressed
    {
        debug!("Auto mouse layer timed out");
        state = 1;
    }

    LayerTransition {
        state,
        auto_mouse_enabled,
    }
}
