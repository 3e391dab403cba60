//! Scroll accumulation and axis snapping.

use crate::config::SCROLL_DIV_UNIT;
use crate::hid::constrain_hid;
use crate::settings::ScrollSnapMode;

/// Whole scroll steps emitted by one accumulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollStep {
    pub h: i32,
    pub v: i32,
}

/// Running sums of trackball counts not yet turned into scroll steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollAccumulator {
    h: i32,
    v: i32,
}

impl ScrollAccumulator {
    pub const fn new() -> Self {
        Self { h: 0, v: 0 }
    }

    /// Counts still waiting for a full step, `(h, v)`.
    pub fn pending(&self) -> (i32, i32) {
        (self.h, self.v)
    }

    pub fn reset(&mut self) {
        self.h = 0;
        self.v = 0;
    }

    /// Add `(dh, dv)` and emit the whole steps of `scroll_div * 8` counts.
    ///
    /// An axis that produces a step keeps only its remainder; one that does
    /// not keeps its full sum.
    pub fn accumulate(&mut self, dh: i32, dv: i32, scroll_div: u8) -> ScrollStep {
        let divisor = (scroll_div.max(1) as i32) * SCROLL_DIV_UNIT;
        self.h = self.h.saturating_add(dh);
        self.v = self.v.saturating_add(dv);

        let h = self.h / divisor;
        if h != 0 {
            self.h %= divisor;
        }
        let v = self.v / divisor;
        if v != 0 {
            self.v %= divisor;
        }
        ScrollStep { h, v }
    }
}

/// Turn emitted steps into report `(h, v)` under the snap policy.
///
/// The vertical step is inverted unless `direction` is set.
pub fn snap(step: ScrollStep, mode: ScrollSnapMode, direction: bool) -> (i8, i8) {
    let v = if direction { step.v } else { -step.v };
    let (h, v) = match mode {
        ScrollSnapMode::Vertical => (0, v),
        ScrollSnapMode::Horizontal => (step.h, 0),
        ScrollSnapMode::Free => (step.h, v),
    };
    (constrain_hid(h), constrain_hid(v))
}
