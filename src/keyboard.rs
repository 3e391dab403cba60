//! Keyboard context: owns the configuration and wires it to the host firmware.
//!
//! The host drives everything from its single control loop:
//!
//! ```text
//! boot:  matrix_init -> pointing_device_init
//! tick:  process_key* -> process_motion -> update_layer_state -> oled_task
//! ```
//!
//! No entry point blocks, and all state lives in [`Keyboard`].

use crate::config::{
    SensorSpec, AUTO_MOUSE_DEFAULT_LAYER, AUTO_MOUSE_TIME_OUT_STEP, OLED_REFRESH_MS,
    SPEED_ADJUST_STEP,
};
use crate::hid::MouseReport;
use crate::keycode::{strip_mods, CustomKeycode};
use crate::layer::{highest_layer, layer_state_set, LayerState};
use crate::pointing::{MotionDelta, PointingProcessor};
use crate::settings::{MtkConfig, ScrollSnapMode};
use crate::storage::{self, KbEeprom, Restore};
use crate::time::timer_elapsed;
use crate::ui::status::{self, PlacedLine};
use crate::ui::{
    oled_rotation, uptime_minutes, AnimationFrame, AnimationPoll, Keylog, Layout, OledRotation,
    OrientationAnimation, StatusView, TypeCounter,
};

/// Services of the surrounding firmware.
pub trait KeyboardHost {
    fn layer_on(&mut self, layer: u8);
    fn layer_off(&mut self, layer: u8);

    /// Arm or disarm the host's automatic mouse layer.
    fn set_auto_mouse_enable(&mut self, enabled: bool);
    fn set_auto_mouse_timeout(&mut self, timeout_ms: u16);

    /// Program the sensor resolution.
    fn set_pointer_cpi(&mut self, cpi: u16);

    /// Clear and re-initialise the OLED with `rotation`.
    fn init_oled(&mut self, rotation: OledRotation);

    fn is_master(&self) -> bool;
    fn is_left(&self) -> bool;
}

/// A key edge delivered by the host's matrix scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub keycode: u16,
    pub pressed: bool,
    pub row: u8,
    pub col: u8,
}

impl KeyEvent {
    pub const fn press(keycode: u16) -> Self {
        Self {
            keycode,
            pressed: true,
            row: 0,
            col: 0,
        }
    }

    pub const fn release(keycode: u16) -> Self {
        Self {
            keycode,
            pressed: false,
            row: 0,
            col: 0,
        }
    }

    pub const fn at(mut self, row: u8, col: u8) -> Self {
        self.row = row;
        self.col = col;
        self
    }
}

/// What the OLED should do this tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OledUpdate {
    /// Leave the panel as it is.
    Unchanged,
    /// Blank the panel.
    Clear,
    /// Draw an orientation sweep frame.
    Animation(AnimationFrame),
    /// Redraw the status rows.
    Status(Layout, heapless::Vec<PlacedLine, 16>),
}

pub struct Keyboard<H: KeyboardHost, E: KbEeprom> {
    host: H,
    eeprom: E,
    config: MtkConfig,
    pointing: PointingProcessor,
    layer_state: LayerState,
    keylog: Keylog,
    type_count: TypeCounter,
    animation: OrientationAnimation,
    last_oled_update: u32,
    now: u32,
}

impl<H: KeyboardHost, E: KbEeprom> Keyboard<H, E> {
    pub fn new(host: H, eeprom: E, sensor: SensorSpec) -> Self {
        Self {
            host,
            eeprom,
            config: MtkConfig::new(sensor),
            pointing: PointingProcessor::new(),
            layer_state: 1,
            keylog: Keylog::new(),
            type_count: TypeCounter::new(),
            animation: OrientationAnimation::new(),
            last_oled_update: 0,
            now: 0,
        }
    }

    pub fn config(&self) -> &MtkConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MtkConfig {
        &mut self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }

    pub fn eeprom_mut(&mut self) -> &mut E {
        &mut self.eeprom
    }

    pub fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    pub fn keylog(&self) -> &Keylog {
        &self.keylog
    }

    pub fn type_count(&self) -> u32 {
        self.type_count.get()
    }

    pub fn pointing(&self) -> &PointingProcessor {
        &self.pointing
    }

    // Lifecycle

    /// Restore the stored configuration, rewriting defaults when it is
    /// missing or corrupt.
    pub fn matrix_init(&mut self) -> Restore {
        let outcome = storage::restore(&mut self.config, &mut self.eeprom);
        info!("Keyboard config restored: {:?}", outcome);
        self.sync_cpi();
        self.reinit_oled();
        outcome
    }

    /// Reset the stored configuration to defaults.
    pub fn eeconfig_init(&mut self) {
        storage::init_defaults(&mut self.config, &mut self.eeprom);
        self.sync_cpi();
        self.reinit_oled();
    }

    /// Push the restored settings to the sensor and the auto mouse layer.
    pub fn pointing_device_init(&mut self) {
        self.config.take_cpi_changed();
        self.host.set_pointer_cpi(self.config.cpi());
        self.host.set_auto_mouse_enable(self.config.auto_mouse_mode());
        self.host
            .set_auto_mouse_timeout(self.config.auto_mouse_time_out());
    }

    pub fn load_config(&mut self) {
        storage::load(&mut self.config, &self.eeprom);
        self.sync_cpi();
        self.reinit_oled();
    }

    pub fn save_config(&mut self) {
        storage::save(&self.config, &mut self.eeprom);
    }

    /// Rotation for this half, given the host's default.
    pub fn oled_rotation(&self, default: OledRotation) -> OledRotation {
        oled_rotation(
            self.host.is_master(),
            self.host.is_left(),
            self.config.oled_orient(),
            default,
        )
    }

    fn reinit_oled(&mut self) {
        let rotation = self.oled_rotation(OledRotation::Rotate0);
        self.host.init_oled(rotation);
    }

    fn sync_cpi(&mut self) {
        if let Some(cpi) = self.config.take_cpi_changed() {
            debug!("Sensor CPI -> {}", cpi);
            self.host.set_pointer_cpi(cpi);
        }
    }

    // Per-tick processing

    /// Build this poll's mouse report from the sensor delta.
    pub fn process_motion(&mut self, delta: MotionDelta, buttons: u8, now: u32) -> MouseReport {
        self.now = now;
        self.sync_cpi();
        self.pointing.process(&mut self.config, delta, buttons, now)
    }

    /// Reconcile a layer state change with the auto mouse layer.
    pub fn update_layer_state(&mut self, state: LayerState, now: u32) -> LayerState {
        self.now = now;
        let transition = layer_state_set(state, &self.config, now);
        self.host
            .set_auto_mouse_enable(transition.auto_mouse_enabled);
        if transition.state != state {
            debug!("Layer state {:x} -> {:x}", state, transition.state);
        }
        self.layer_state = transition.state;
        transition.state
    }

    /// Handle a key edge. Returns `false` when the key was consumed.
    pub fn process_key(&mut self, event: KeyEvent, now: u32) -> bool {
        self.now = now;
        if event.pressed {
            self.type_count.count();
        }

        if CustomKeycode::from_u16(event.keycode) == Some(CustomKeycode::ScrlMo) {
            self.config.key_pressed = event.pressed;
            self.config.set_scroll_mode(event.pressed);
            if event.pressed {
                self.host.layer_on(AUTO_MOUSE_DEFAULT_LAYER);
            } else {
                self.host.layer_off(AUTO_MOUSE_DEFAULT_LAYER);
            }
            return false;
        }

        let keycode = strip_mods(event.keycode);
        if !event.pressed {
            return true;
        }
        self.keylog.record(keycode, event.row, event.col);

        let Some(action) = CustomKeycode::from_u16(keycode) else {
            return true;
        };
        debug!("Keyboard action {:?}", action);
        self.apply(action, now);
        false
    }

    fn apply(&mut self, action: CustomKeycode, now: u32) {
        match action {
            CustomKeycode::KbcLoad => self.load_config(),
            CustomKeycode::KbcSave => self.save_config(),
            CustomKeycode::CpiI10 => self.add_cpi(10),
            CustomKeycode::CpiD10 => self.add_cpi(-10),
            CustomKeycode::CpiI100 => self.add_cpi(100),
            CustomKeycode::CpiD100 => self.add_cpi(-100),
            CustomKeycode::CpiI1k => self.add_cpi(1000),
            CustomKeycode::CpiD1k => self.add_cpi(-1000),
            CustomKeycode::ScrlTo => {
                let mode = !self.config.scroll_mode();
                self.config.set_scroll_mode(mode);
            }
            // Both edges are handled before the press-only actions.
            CustomKeycode::ScrlMo => {}
            CustomKeycode::ScrlInv => {
                let direction = !self.config.scroll_direction();
                self.config.set_scroll_direction(direction);
            }
            CustomKeycode::ScrlDvi => self.config.add_scroll_div(1),
            CustomKeycode::ScrlDvd => self.config.add_scroll_div(-1),
            CustomKeycode::AmTg => {
                let mode = !self.config.auto_mouse_mode();
                self.config.set_auto_mouse_mode(mode);
                self.save_config();
            }
            CustomKeycode::AmToutInc => self.add_auto_mouse_time_out(AUTO_MOUSE_TIME_OUT_STEP),
            CustomKeycode::AmToutDec => self.add_auto_mouse_time_out(-AUTO_MOUSE_TIME_OUT_STEP),
            CustomKeycode::SsnpVrt => self
                .config
                .set_scroll_snap_mode(ScrollSnapMode::Vertical.as_u8()),
            CustomKeycode::SsnpHor => self
                .config
                .set_scroll_snap_mode(ScrollSnapMode::Horizontal.as_u8()),
            CustomKeycode::SsnpFre => self.config.set_scroll_snap_mode(ScrollSnapMode::Free.as_u8()),
            CustomKeycode::AdjmsTg => {
                let enabled = !self.config.speed_adjust_enabled();
                self.config.set_speed_adjust_enabled(enabled);
            }
            CustomKeycode::AdjmsSpdInc => self
                .config
                .add_speed_adjust_value(SPEED_ADJUST_STEP as i32),
            CustomKeycode::AdjmsSpdDec => self
                .config
                .add_speed_adjust_value(-(SPEED_ADJUST_STEP as i32)),
            CustomKeycode::OledOriTg => {
                self.animation.start(now);
                let orient = 1 - self.config.oled_orient();
                self.config.set_oled_orient(orient);
                info!("OLED orientation -> {}", orient);
                self.reinit_oled();
            }
        }
    }

    fn add_cpi(&mut self, delta: i32) {
        self.config.add_cpi(delta);
        self.sync_cpi();
    }

    fn add_auto_mouse_time_out(&mut self, delta: i32) {
        self.config.add_auto_mouse_time_out(delta);
        self.host
            .set_auto_mouse_timeout(self.config.auto_mouse_time_out());
        self.save_config();
    }

    // OLED

    /// Snapshot of everything the status rows show.
    pub fn status_view(&self) -> StatusView<'_> {
        StatusView {
            config: &self.config,
            layer: highest_layer(self.layer_state),
            keylog: &self.keylog,
            type_count: self.type_count,
            uptime_minutes: uptime_minutes(self.now),
        }
    }

    /// Periodic OLED work: the orientation sweep while it runs, otherwise
    /// a status refresh every [`OLED_REFRESH_MS`].
    pub fn oled_task(&mut self, now: u32) -> OledUpdate {
        self.now = now;
        match self.animation.poll(now) {
            AnimationPoll::Frame(frame) => return OledUpdate::Animation(frame),
            AnimationPoll::Finished => return OledUpdate::Clear,
            AnimationPoll::Wait => return OledUpdate::Unchanged,
            AnimationPoll::Idle => {}
        }

        if timer_elapsed(now, self.last_oled_update) <= OLED_REFRESH_MS {
            return OledUpdate::Unchanged;
        }
        self.last_oled_update = now;

        let layout = Layout::select(self.host.is_master(), self.config.oled_orient());
        OledUpdate::Status(layout, status::render(layout, &self.status_view()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PMW3389;
    use crate::keycode::QK_KB_0;
    use crate::storage::RamEeprom;

    #[derive(Default)]
    struct Host {
        cpi: Option<u16>,
        auto_mouse: Option<bool>,
        timeout: Option<u16>,
        layers_on: heapless::Vec<u8, 8>,
        layers_off: heapless::Vec<u8, 8>,
        rotations: heapless::Vec<OledRotation, 8>,
        slave: bool,
    }

    impl KeyboardHost for Host {
        fn layer_on(&mut self, layer: u8) {
            let _ = self.layers_on.push(layer);
        }
        fn layer_off(&mut self, layer: u8) {
            let _ = self.layers_off.push(layer);
        }
        fn set_auto_mouse_enable(&mut self, enabled: bool) {
            self.auto_mouse = Some(enabled);
        }
        fn set_auto_mouse_timeout(&mut self, timeout_ms: u16) {
            self.timeout = Some(timeout_ms);
        }
        fn set_pointer_cpi(&mut self, cpi: u16) {
            self.cpi = Some(cpi);
        }
        fn init_oled(&mut self, rotation: OledRotation) {
            let _ = self.rotations.push(rotation);
        }
        fn is_master(&self) -> bool {
            !self.slave
        }
        fn is_left(&self) -> bool {
            false
        }
    }

    fn keyboard() -> Keyboard<Host, RamEeprom<64>> {
        let mut kb = Keyboard::new(Host::default(), RamEeprom::new(), PMW3389);
        kb.matrix_init();
        kb
    }

    fn press(kb: &mut Keyboard<Host, RamEeprom<64>>, kc: CustomKeycode) -> bool {
        kb.process_key(KeyEvent::press(kc.code()), 0)
    }

    #[test]
    fn cpi_keys_step_and_reach_sensor() {
        let mut kb = keyboard();
        assert!(!press(&mut kb, CustomKeycode::CpiI100));
        assert_eq!(kb.config().cpi(), 1100);
        assert_eq!(kb.host().cpi, Some(1100));
        press(&mut kb, CustomKeycode::CpiD1k);
        press(&mut kb, CustomKeycode::CpiD1k);
        assert_eq!(kb.config().cpi(), 100);
        press(&mut kb, CustomKeycode::CpiI10);
        assert_eq!(kb.config().cpi(), 110);
    }

    #[test]
    fn unknown_keys_pass_through() {
        let mut kb = keyboard();
        assert!(kb.process_key(KeyEvent::press(0x0004), 0));
        assert!(kb.process_key(KeyEvent::release(0x0004), 0));
        assert!(kb.process_key(KeyEvent::release(CustomKeycode::CpiI10.code()), 0));
        assert_eq!(kb.config().cpi(), 1000);
    }

    #[test]
    fn momentary_scroll_acts_on_both_edges() {
        let mut kb = keyboard();
        let code = CustomKeycode::ScrlMo.code();
        assert!(!kb.process_key(KeyEvent::press(code), 0));
        assert!(kb.config().key_pressed);
        assert!(kb.config().scroll_mode());
        assert_eq!(kb.host().layers_on.as_slice(), &[AUTO_MOUSE_DEFAULT_LAYER]);

        assert!(!kb.process_key(KeyEvent::release(code), 0));
        assert!(!kb.config().key_pressed);
        assert!(!kb.config().scroll_mode());
        assert_eq!(kb.host().layers_off.as_slice(), &[AUTO_MOUSE_DEFAULT_LAYER]);
    }

    #[test]
    fn modded_keys_are_logged_without_mods() {
        let mut kb = keyboard();
        // LSFT(KC_A) strips to KC_A, which is not a keyboard action.
        assert!(kb.process_key(KeyEvent::press(0x0204).at(1, 2), 0));
        assert_eq!(kb.keylog().keycode, 0x04);
        assert_eq!((kb.keylog().row, kb.keylog().col), (1, 2));
    }

    #[test]
    fn auto_mouse_changes_persist_immediately() {
        let mut kb = keyboard();
        press(&mut kb, CustomKeycode::AmTg);
        assert!(!kb.config().auto_mouse_mode());
        let stored = storage::EeConfig::from_raw(storage::read_kb_64(kb.eeprom()));
        assert_eq!(stored.auto_mouse, 0);

        press(&mut kb, CustomKeycode::AmToutInc);
        assert_eq!(kb.config().auto_mouse_time_out(), 650);
        assert_eq!(kb.host().timeout, Some(650));
        press(&mut kb, CustomKeycode::AmToutInc);
        let stored = storage::EeConfig::from_raw(storage::read_kb_64(kb.eeprom()));
        assert_eq!(stored.auto_mouse_time_out, 7);
    }

    #[test]
    fn other_changes_wait_for_save() {
        let mut kb = keyboard();
        press(&mut kb, CustomKeycode::ScrlDvi);
        press(&mut kb, CustomKeycode::SsnpFre);
        let stored = storage::EeConfig::from_raw(storage::read_kb_64(kb.eeprom()));
        assert_eq!(stored.scroll_div, 10);
        assert_eq!(stored.scroll_snap_mode, 0);

        press(&mut kb, CustomKeycode::KbcSave);
        let stored = storage::EeConfig::from_raw(storage::read_kb_64(kb.eeprom()));
        assert_eq!(stored.scroll_div, 11);
        assert_eq!(stored.scroll_snap_mode, 2);
    }

    #[test]
    fn load_discards_unsaved_changes() {
        let mut kb = keyboard();
        press(&mut kb, CustomKeycode::CpiI1k);
        press(&mut kb, CustomKeycode::KbcLoad);
        assert_eq!(kb.config().cpi(), 1000);
        assert_eq!(kb.host().cpi, Some(1000));
    }

    #[test]
    fn toggles() {
        let mut kb = keyboard();
        press(&mut kb, CustomKeycode::ScrlTo);
        assert!(kb.config().scroll_mode());
        press(&mut kb, CustomKeycode::ScrlInv);
        assert!(kb.config().scroll_direction());
        press(&mut kb, CustomKeycode::AdjmsTg);
        assert!(!kb.config().speed_adjust_enabled());
        press(&mut kb, CustomKeycode::AdjmsSpdDec);
        assert_eq!(kb.config().speed_adjust_value(), 14);
        press(&mut kb, CustomKeycode::SsnpHor);
        assert_eq!(kb.config().scroll_snap_mode(), ScrollSnapMode::Horizontal);
        press(&mut kb, CustomKeycode::SsnpVrt);
        assert_eq!(kb.config().scroll_snap_mode(), ScrollSnapMode::Vertical);
    }

    #[test]
    fn orientation_toggle_reinits_oled_and_animates() {
        let mut kb = keyboard();
        assert_eq!(kb.host().rotations.last(), Some(&OledRotation::Rotate270));
        kb.process_key(KeyEvent::press(CustomKeycode::OledOriTg.code()), 5000);
        assert_eq!(kb.config().oled_orient(), 0);
        assert_eq!(kb.host().rotations.last(), Some(&OledRotation::Rotate0));

        assert_eq!(kb.oled_task(5050), OledUpdate::Unchanged);
        assert_eq!(
            kb.oled_task(5120),
            OledUpdate::Animation(AnimationFrame { step: 0 })
        );
    }

    #[test]
    fn presses_are_counted() {
        let mut kb = keyboard();
        kb.process_key(KeyEvent::press(0x04), 0);
        kb.process_key(KeyEvent::release(0x04), 0);
        kb.process_key(KeyEvent::press(QK_KB_0 + 2), 0);
        assert_eq!(kb.type_count(), 2);
    }

    #[test]
    fn oled_refresh_is_throttled() {
        let mut kb = keyboard();
        assert!(matches!(
            kb.oled_task(1000),
            OledUpdate::Status(Layout::Portrait, ref lines) if lines.len() == 16
        ));
        assert_eq!(kb.oled_task(1100), OledUpdate::Unchanged);
        assert!(matches!(kb.oled_task(1101), OledUpdate::Status(..)));
    }

    #[test]
    fn slave_layout() {
        let mut kb = Keyboard::new(
            Host {
                slave: true,
                ..Host::default()
            },
            RamEeprom::<64>::new(),
            PMW3389,
        );
        kb.matrix_init();
        assert_eq!(kb.host().rotations.last(), Some(&OledRotation::Rotate0));
        assert!(matches!(
            kb.oled_task(1000),
            OledUpdate::Status(Layout::Slave, ref lines) if lines.is_empty()
        ));
    }

    #[test]
    fn layer_update_arms_host() {
        let mut kb = keyboard();
        let state = kb.update_layer_state(1 << 3 | 1, 0);
        assert_eq!(state, 1 << 3 | 1);
        assert_eq!(kb.host().auto_mouse, Some(false));
        assert_eq!(kb.layer_state(), state);
        assert_eq!(kb.status_view().layer, 3);
    }
}
