//! Keyboard-level extension layer for the mtk64erp split trackball keyboard.
//!
//! The host firmware owns the matrix scan, the sensor driver and the USB
//! stack. This crate supplies everything on top of that:
//!
//! - [`pointing`]: speed curve for the trackball and the snapped scroll
//! - [`settings`] + [`storage`]: clamped runtime settings and their 8-byte
//!   persisted record
//! - [`layer`]: the auto mouse layer rules
//! - [`keyboard`]: the custom keycode router tying it all to the host
//! - [`ui`]: OLED status text and the orientation sweep
//!
//! Everything is `no_std` and host-testable; the flash and SSD1306 backends
//! sit behind the `embedded` feature.
//!
//! Usage: `cargo test` (logs go through `env_logger`, set `RUST_LOG=debug`)

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod hid;
pub mod keyboard;
pub mod keycode;
pub mod layer;
pub mod pointing;
pub mod settings;
pub mod storage;
pub mod time;
pub mod ui;

pub use error::Error;
pub use hid::MouseReport;
pub use keyboard::{KeyEvent, Keyboard, KeyboardHost, OledUpdate};
pub use keycode::CustomKeycode;
pub use layer::LayerState;
pub use pointing::{MotionDelta, PointingProcessor};
pub use settings::{MtkConfig, ScrollSnapMode};
pub use storage::{EeConfig, KbEeprom, RamEeprom, Restore};

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module tests
// ═══════════════════════════════════════════════════════════════════════════
