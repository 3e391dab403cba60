//! Sweep animation played after the OLED orientation is toggled.
//!
//! Each frame fills one more column of every row, with each row lagging
//! one step behind the row above, until the whole panel is covered.

use crate::config::{OLED_ANIMATION_ROWS, OLED_ANIMATION_TIME_MS, OLED_WIDTH};
use crate::time::timer_elapsed;

/// Columns swept plus the lag of the last row.
pub const TOTAL_FRAMES: u8 = OLED_WIDTH + OLED_ANIMATION_ROWS;

/// Delay between frames (ms).
pub const FRAME_DELAY_MS: u32 = OLED_ANIMATION_TIME_MS / TOTAL_FRAMES as u32;

/// One animation row of `OLED_WIDTH` cells.
pub type AnimationRow = heapless::String<{ OLED_WIDTH as usize }>;

/// A frame to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationFrame {
    pub step: u8,
}

impl AnimationFrame {
    /// Cells of `row` already reached by the sweep.
    pub fn filled_columns(&self, row: u8) -> u8 {
        if self.step >= row {
            (self.step - row + 1).min(OLED_WIDTH)
        } else {
            0
        }
    }

    /// Filled cells are `>` (drawn inverted), the rest `-`.
    pub fn row(&self, row: u8) -> AnimationRow {
        let filled = self.filled_columns(row);
        let mut s = AnimationRow::new();
        for col in 0..OLED_WIDTH {
            let _ = s.push(if col < filled { '>' } else { '-' });
        }
        s
    }
}

/// Result of polling the animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationPoll {
    /// Not running.
    Idle,
    /// Running, next frame not due yet.
    Wait,
    /// Draw this frame.
    Frame(AnimationFrame),
    /// Just ended; clear the panel.
    Finished,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrientationAnimation {
    step: u8,
    last_frame: u32,
    running: bool,
}

impl OrientationAnimation {
    pub const fn new() -> Self {
        Self {
            step: 0,
            last_frame: 0,
            running: false,
        }
    }

    pub fn start(&mut self, now: u32) {
        self.step = 0;
        self.last_frame = now;
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn poll(&mut self, now: u32) -> AnimationPoll {
        if !self.running {
            return AnimationPoll::Idle;
        }
        if timer_elapsed(now, self.last_frame) < FRAME_DELAY_MS {
            return AnimationPoll::Wait;
        }
        self.last_frame = now;

        if self.step >= TOTAL_FRAMES {
            self.running = false;
            return AnimationPoll::Finished;
        }
        let frame = AnimationFrame { step: self.step };
        self.step += 1;
        AnimationPoll::Frame(frame)
    }
}
