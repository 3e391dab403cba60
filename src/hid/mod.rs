//! HID report types produced by the keyboard.

pub mod mouse;


pub use mouse::{constrain_hid, MouseReport};
