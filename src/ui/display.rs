//! SSD1306 OLED backend for the status text.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use super::animation::AnimationFrame;
use super::status::PlacedLine;
use super::OledRotation;
use crate::config::OLED_ANIMATION_ROWS;

/// Height of one text row in pixels.
const ROW_HEIGHT: i32 = 8;

/// Width of one character cell in pixels.
const CHAR_WIDTH: i32 = 6;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

impl From<OledRotation> for DisplayRotation {
    fn from(rotation: OledRotation) -> Self {
        match rotation {
            OledRotation::Rotate0 => DisplayRotation::Rotate0,
            OledRotation::Rotate90 => DisplayRotation::Rotate90,
            OledRotation::Rotate180 => DisplayRotation::Rotate180,
            OledRotation::Rotate270 => DisplayRotation::Rotate270,
        }
    }
}

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C, rotation: OledRotation) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, rotation.into())
        .into_buffered_graphics_mode();
    if display.init().is_err() {
        warn!("OLED init failed");
    }
    display.clear_buffer();
    let _ = display.flush();
    display
}

/// Re-apply the rotation after an orientation change.
pub fn set_rotation<I2C>(display: &mut Display<I2C>, rotation: OledRotation)
where
    I2C: embedded_hal::i2c::I2c,
{
    let _ = display.set_rotation(rotation.into());
    display.clear_buffer();
    let _ = display.flush();
}

fn text_style(inverted: bool) -> MonoTextStyle<'static, BinaryColor> {
    let builder = MonoTextStyleBuilder::new().font(&FONT_6X10);
    if inverted {
        builder
            .text_color(BinaryColor::Off)
            .background_color(BinaryColor::On)
            .build()
    } else {
        builder.text_color(BinaryColor::On).build()
    }
}

fn draw_row<I2C>(display: &mut Display<I2C>, row: u8, text: &str, inverted: bool)
where
    I2C: embedded_hal::i2c::I2c,
{
    let origin = Point::new(0, row as i32 * ROW_HEIGHT);
    let _ = Text::with_baseline(text, origin, text_style(inverted), Baseline::Top).draw(display);
}

/// Render a full set of status rows.
pub fn draw_status<I2C>(display: &mut Display<I2C>, lines: &[PlacedLine])
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();
    for line in lines {
        draw_row(display, line.row, line.text.as_str(), false);
    }
    let _ = display.flush();
}

/// Render one sweep frame; filled cells are drawn inverted.
pub fn draw_animation<I2C>(display: &mut Display<I2C>, frame: AnimationFrame)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();
    for row in 0..OLED_ANIMATION_ROWS {
        let text = frame.row(row);
        let filled = frame.filled_columns(row) as usize;
        let (on, off) = text.as_str().split_at(filled.min(text.len()));
        draw_row(display, row, on, true);
        let origin = Point::new(filled as i32 * CHAR_WIDTH, row as i32 * ROW_HEIGHT);
        let _ = Text::with_baseline(off, origin, text_style(false), Baseline::Top).draw(display);
    }
    let _ = display.flush();
}

pub fn clear<I2C>(display: &mut Display<I2C>)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();
    let _ = display.flush();
}
