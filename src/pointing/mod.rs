//! Trackball report pipeline.
//!
//! ```text
//! sensor delta --> axis remap --+-- scroll mode --> ScrollAccumulator --> snap --> h / v
//!                               |
//!                               +-- pointer mode --> acceleration curve ------> x / y
//! ```
//!
//! The sensor is mounted rotated, so the remapped axes are `x = -dy`,
//! `y = -dx`.

pub mod motion;
pub mod scroll;

pub use motion::motion_to_mouse;
pub use scroll::{ScrollAccumulator, ScrollStep};

use crate::hid::{constrain_hid, MouseReport};
use crate::settings::MtkConfig;

/// Relative motion read from the sensor in one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionDelta {
    pub dx: i16,
    pub dy: i16,
}

impl MotionDelta {
    pub const fn new(dx: i16, dy: i16) -> Self {
        Self { dx, dy }
    }
}

/// Converts sensor motion into mouse reports.
#[derive(Clone, Debug, Default)]
pub struct PointingProcessor {
    scroll: ScrollAccumulator,
}

impl PointingProcessor {
    pub const fn new() -> Self {
        Self {
            scroll: ScrollAccumulator::new(),
        }
    }

    pub fn scroll(&self) -> &ScrollAccumulator {
        &self.scroll
    }

    /// Build the report for one poll and update the motion tracker.
    pub fn process(
        &mut self,
        config: &mut MtkConfig,
        delta: MotionDelta,
        buttons: u8,
        now: u32,
    ) -> MouseReport {
        let mut report = MouseReport {
            buttons,
            ..MouseReport::empty()
        };

        let x_rev = -(delta.dy as i32);
        let y_rev = -(delta.dx as i32);

        if config.scroll_mode() {
            let step = self.scroll.accumulate(x_rev, y_rev, config.scroll_div());
            let (h, v) = scroll::snap(step, config.scroll_snap_mode(), config.scroll_direction());
            report.h = h;
            report.v = v;
        } else {
            self.scroll.reset();
            if config.speed_adjust_enabled() {
                // The curve is added on top of the raw sensor delta.
                report.x = constrain_hid(delta.dx as i32);
                report.y = constrain_hid(delta.dy as i32);
                motion_to_mouse(
                    &mut report,
                    delta.dx,
                    delta.dy,
                    config.speed_adjust_value(),
                    config.cpi(),
                );
                // Raw delta and curve are both odd per axis, so remapping
                // after them matches remapping before them.
                let (x, y) = (report.x, report.y);
                report.x = -y;
                report.y = -x;
            } else {
                report.x = constrain_hid(x_rev);
                report.y = constrain_hid(y_rev);
            }
        }

        config
            .motion
            .track(report.x, report.y, report.has_motion(), now);
        report
    }
}
