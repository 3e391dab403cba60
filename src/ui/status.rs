//! Status text, one line per OLED row.
//!
//! Rows are selected by enum rather than a table of callbacks; every row
//! renders from the same [`StatusView`] snapshot. Icons of the stock
//! firmware are replaced by glyphs:
//!
//! | glyph | meaning                         |
//! |-------|---------------------------------|
//! | `=`   | layer reached (landscape rail)  |
//! | `>`   | active layer cell               |
//! | `*`   | type count cell / top layer     |
//! | `[X]` | flag on, lowercase when off     |

use core::fmt::Write;

use crate::config::{AUTO_MOUSE_THRESHOLD, LAYER_COUNT, OLED_WIDTH, OLED_WIDTH_SLAVE};
use crate::settings::{MtkConfig, ScrollSnapMode};

use super::keylog::Keylog;
use super::TypeCounter;

/// Characters per row on a 128 px wide panel.
pub const LINE_WIDTH: usize = 21;

/// One rendered row.
pub type StatusLine = heapless::String<LINE_WIDTH>;

const LAYER_NAMES: [&str; 8] = [
    "Deflt", "Shift", "Mails", "Numbr", "Excel", "Teams", "Setup", "Mouse",
];

pub fn layer_name(layer: u8) -> &'static str {
    LAYER_NAMES.get(layer as usize).copied().unwrap_or("UNK")
}

/// Snap label for a raw mode value.
pub fn snap_label(raw: u8) -> &'static str {
    match raw {
        0..=2 => ScrollSnapMode::from_u8(raw).label(),
        _ => "UNK",
    }
}

/// Which screen the OLED shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    Landscape,
    Portrait,
    Slave,
}

impl Layout {
    pub fn select(is_master: bool, oled_orient: u8) -> Self {
        match (is_master, oled_orient) {
            (false, _) => Layout::Slave,
            (true, 0) => Layout::Landscape,
            (true, _) => Layout::Portrait,
        }
    }
}

/// Everything the status rows show.
#[derive(Clone, Copy, Debug)]
pub struct StatusView<'a> {
    pub config: &'a MtkConfig,
    pub layer: u8,
    pub keylog: &'a Keylog,
    pub type_count: TypeCounter,
    pub uptime_minutes: u32,
}

impl StatusView<'_> {
    fn motion(&self) -> u32 {
        self.config.motion.magnitude()
    }

    /// Layer bar: typing progress on layer 0, otherwise one cell per layer.
    /// `mirrored` fills from the right.
    fn indicator_bar(&self, width: u8, mirrored: bool) -> StatusLine {
        let lit = self.type_count.indicators(width);
        let active = if mirrored { '<' } else { '>' };
        let mut s = StatusLine::new();
        for i in 0..width {
            let pos = if mirrored { width - 1 - i } else { i };
            let c = if self.layer == 0 {
                if pos < lit {
                    '*'
                } else {
                    '-'
                }
            } else if pos < self.layer {
                active
            } else if self.layer == LAYER_COUNT - 1 {
                '*'
            } else {
                '-'
            };
            let _ = s.push(c);
        }
        s
    }

    /// Landscape rail cell for `row`.
    fn rail(&self, row: u8) -> &'static str {
        if self.layer < LAYER_COUNT && row <= self.layer {
            "="
        } else {
            "|"
        }
    }

    fn speed_adjust(&self) -> Field {
        let v = self.config.speed_adjust_value();
        fmt_field(format_args!("{}.{}", v / 10, v % 10))
    }

    fn snap_is_axis_locked(&self) -> bool {
        matches!(
            self.config.scroll_snap_mode(),
            ScrollSnapMode::Vertical | ScrollSnapMode::Horizontal
        )
    }

    fn keylog_name(&self) -> Field {
        let mut f = Field::new();
        let _ = f.push_str(self.keylog.name_str().as_str());
        f
    }
}

type Field = heapless::String<LINE_WIDTH>;

fn fmt_field(args: core::fmt::Arguments<'_>) -> Field {
    let mut f = Field::new();
    let _ = f.write_fmt(args);
    f
}

fn flag(label: &str, on: bool) -> Field {
    let mut f = Field::new();
    if on {
        let _ = write!(f, "[{}]", label);
    } else {
        let _ = f.push(' ');
        for c in label.chars() {
            let _ = f.push(c.to_ascii_lowercase());
        }
        let _ = f.push(' ');
    }
    f
}

/// Builds a line by placing text at character columns.
struct Line(StatusLine);

impl Line {
    fn new() -> Self {
        Line(StatusLine::new())
    }

    fn at(mut self, col: usize, text: &str) -> Self {
        while self.0.len() < col && self.0.push(' ').is_ok() {}
        for c in text.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        self
    }

    fn width(mut self, width: usize) -> StatusLine {
        self.0.truncate(width);
        self.0
    }
}

/// Rows of the master half in landscape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LandscapeRow {
    Keylog,
    Cpi,
    Threshold,
    Motion,
    LayerName,
    ScrollDiv,
    Title,
    SnapMode,
}

impl LandscapeRow {
    pub const ALL: [LandscapeRow; 8] = [
        LandscapeRow::Keylog,
        LandscapeRow::Cpi,
        LandscapeRow::Threshold,
        LandscapeRow::Motion,
        LandscapeRow::LayerName,
        LandscapeRow::ScrollDiv,
        LandscapeRow::Title,
        LandscapeRow::SnapMode,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn render(self, view: &StatusView<'_>) -> StatusLine {
        let c = view.config;
        let rail = view.rail(self.index());
        let line = match self {
            LandscapeRow::Keylog => Line::new()
                .at(0, "Layer")
                .at(5, rail)
                .at(7, view.keylog.hex_str().as_str())
                .at(11, "(")
                .at(12, view.keylog_name().as_str())
                .at(13, ")")
                .at(15, rail)
                .at(16, flag("AML", c.auto_mouse_mode()).as_str()),
            LandscapeRow::Cpi => Line::new()
                .at(1, fmt_field(format_args!("{}", view.layer)).as_str())
                .at(5, rail)
                .at(7, fmt_field(format_args!("CPI:{:<4}", c.cpi())).as_str())
                .at(15, rail)
                .at(16, fmt_field(format_args!("{:>5}", c.auto_mouse_time_out())).as_str()),
            LandscapeRow::Threshold => Line::new()
                .at(5, rail)
                .at(7, fmt_field(format_args!("THR:{:<3}", AUTO_MOUSE_THRESHOLD)).as_str())
                .at(15, rail)
                .at(16, flag("ADJ", c.speed_adjust_enabled()).as_str()),
            LandscapeRow::Motion => Line::new()
                .at(5, rail)
                .at(7, fmt_field(format_args!("MTN:{:<3}", view.motion())).as_str())
                .at(15, rail)
                .at(17, view.speed_adjust().as_str()),
            LandscapeRow::LayerName => Line::new()
                .at(0, layer_name(view.layer))
                .at(5, rail)
                .at(15, rail)
                .at(16, flag("SCR", c.scroll_mode()).as_str()),
            LandscapeRow::ScrollDiv => Line::new()
                .at(5, rail)
                .at(15, rail)
                .at(17, fmt_field(format_args!("{:<3}", c.scroll_div())).as_str()),
            LandscapeRow::Title => Line::new()
                .at(0, "Mtk64")
                .at(5, rail)
                .at(15, rail)
                .at(16, flag("SSM", view.snap_is_axis_locked()).as_str()),
            LandscapeRow::SnapMode => Line::new()
                .at(1, "erp")
                .at(5, rail)
                .at(15, rail)
                .at(17, snap_label(c.scroll_snap_mode().as_u8())),
        };
        line.width(LINE_WIDTH)
    }
}

/// Rows of the master half in portrait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortraitRow {
    Modes,
    Timing,
    Adjust,
    SpeedSnap,
    Indicator,
    LayerNumber,
    LayerName,
    Indicator2,
    KeyPosition,
    KeyCode,
    Indicator3,
    Cpi,
    Threshold,
    Motion,
    Uptime,
    TypeCount,
}

impl PortraitRow {
    pub const ALL: [PortraitRow; 16] = [
        PortraitRow::Modes,
        PortraitRow::Timing,
        PortraitRow::Adjust,
        PortraitRow::SpeedSnap,
        PortraitRow::Indicator,
        PortraitRow::LayerNumber,
        PortraitRow::LayerName,
        PortraitRow::Indicator2,
        PortraitRow::KeyPosition,
        PortraitRow::KeyCode,
        PortraitRow::Indicator3,
        PortraitRow::Cpi,
        PortraitRow::Threshold,
        PortraitRow::Motion,
        PortraitRow::Uptime,
        PortraitRow::TypeCount,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn render(self, view: &StatusView<'_>) -> StatusLine {
        let c = view.config;
        let line = match self {
            PortraitRow::Modes => Line::new()
                .at(0, flag("AML", c.auto_mouse_mode()).as_str())
                .at(5, flag("SCR", c.scroll_mode()).as_str()),
            PortraitRow::Timing => Line::new()
                .at(0, fmt_field(format_args!("{:<5}", c.auto_mouse_time_out())).as_str())
                .at(6, fmt_field(format_args!("{:>3}", c.scroll_div())).as_str()),
            PortraitRow::Adjust => Line::new()
                .at(0, flag("ADJ", c.speed_adjust_enabled()).as_str())
                .at(5, flag("SSM", view.snap_is_axis_locked()).as_str()),
            PortraitRow::SpeedSnap => Line::new()
                .at(1, view.speed_adjust().as_str())
                .at(6, snap_label(c.scroll_snap_mode().as_u8())),
            PortraitRow::Indicator | PortraitRow::Indicator2 | PortraitRow::Indicator3 => {
                Line::new().at(0, view.indicator_bar(OLED_WIDTH, false).as_str())
            }
            PortraitRow::LayerNumber => Line::new()
                .at(0, "Layer")
                .at(7, fmt_field(format_args!("{}", view.layer)).as_str()),
            PortraitRow::LayerName => Line::new().at(0, layer_name(view.layer)),
            PortraitRow::KeyPosition => Line::new()
                .at(0, "R")
                .at(2, view.keylog.row_str().as_str())
                .at(5, "C")
                .at(7, view.keylog.col_str().as_str()),
            PortraitRow::KeyCode => Line::new()
                .at(0, "x")
                .at(2, view.keylog.hex_str().as_str())
                .at(7, "(")
                .at(8, view.keylog_name().as_str())
                .at(9, ")"),
            PortraitRow::Cpi => Line::new()
                .at(0, "CP")
                .at(2, fmt_field(format_args!("{:>5}", c.cpi())).as_str()),
            PortraitRow::Threshold => Line::new()
                .at(0, "TH")
                .at(2, fmt_field(format_args!("{:>3}", AUTO_MOUSE_THRESHOLD)).as_str()),
            PortraitRow::Motion => Line::new()
                .at(0, "MN")
                .at(2, fmt_field(format_args!("{:>3}", view.motion())).as_str()),
            PortraitRow::Uptime => Line::new()
                .at(0, "UP")
                .at(2, fmt_field(format_args!("{:>3}", view.uptime_minutes)).as_str()),
            PortraitRow::TypeCount => Line::new()
                .at(0, "CN")
                .at(4, fmt_field(format_args!("{:>5}", view.type_count.get())).as_str()),
        };
        line.width(OLED_WIDTH as usize)
    }
}

/// Rows of the slave half, drawn while a layer above 0 is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveRow {
    /// Row 0: layer number and left-to-right bar.
    Header,
    /// Row 6: layer number on the right edge.
    Layer,
    /// Row 7: right-to-left bar.
    Footer,
}

impl SlaveRow {
    pub const ALL: [SlaveRow; 3] = [SlaveRow::Header, SlaveRow::Layer, SlaveRow::Footer];

    pub fn index(self) -> u8 {
        match self {
            SlaveRow::Header => 0,
            SlaveRow::Layer => 6,
            SlaveRow::Footer => 7,
        }
    }

    pub fn render(self, view: &StatusView<'_>) -> StatusLine {
        let layer = fmt_field(format_args!("{}", view.layer));
        let line = match self {
            SlaveRow::Header => Line::new()
                .at(0, layer.as_str())
                .at(5, view.indicator_bar(OLED_WIDTH_SLAVE, false).as_str()),
            SlaveRow::Layer => Line::new().at(16, layer.as_str()),
            SlaveRow::Footer => {
                Line::new().at(1, view.indicator_bar(OLED_WIDTH_SLAVE, true).as_str())
            }
        };
        line.width(LINE_WIDTH)
    }
}

/// A rendered row with its position on the panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLine {
    pub row: u8,
    pub text: StatusLine,
}

/// Every row of `layout`, top to bottom.
///
/// The slave shows nothing on the default layer.
pub fn render(layout: Layout, view: &StatusView<'_>) -> heapless::Vec<PlacedLine, 16> {
    let mut lines = heapless::Vec::new();
    match layout {
        Layout::Landscape => {
            for row in LandscapeRow::ALL {
                let _ = lines.push(PlacedLine {
                    row: row.index(),
                    text: row.render(view),
                });
            }
        }
        Layout::Portrait => {
            for row in PortraitRow::ALL {
                let _ = lines.push(PlacedLine {
                    row: row.index(),
                    text: row.render(view),
                });
            }
        }
        Layout::Slave if view.layer != 0 => {
            for row in SlaveRow::ALL {
                let _ = lines.push(PlacedLine {
                    row: row.index(),
                    text: row.render(view),
                });
            }
        }
        Layout::Slave => {}
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(config: &'a MtkConfig, keylog: &'a Keylog, layer: u8) -> StatusView<'a> {
        StatusView {
            config,
            layer,
            keylog,
            type_count: TypeCounter::new(),
            uptime_minutes: 0,
        }
    }

    #[test]
    fn layer_names_and_fallback() {
        assert_eq!(layer_name(0), "Deflt");
        assert_eq!(layer_name(7), "Mouse");
        assert_eq!(layer_name(8), "UNK");
    }

    #[test]
    fn snap_labels() {
        assert_eq!(snap_label(0), "VER");
        assert_eq!(snap_label(1), "HOR");
        assert_eq!(snap_label(2), "FRE");
        assert_eq!(snap_label(3), "UNK");
    }

    #[test]
    fn layout_selection() {
        assert_eq!(Layout::select(true, 0), Layout::Landscape);
        assert_eq!(Layout::select(true, 1), Layout::Portrait);
        assert_eq!(Layout::select(false, 0), Layout::Slave);
    }

    #[test]
    fn portrait_speed_and_snap() {
        let mut config = MtkConfig::default();
        config.set_speed_adjust_value(15);
        config.set_scroll_snap_mode(1);
        let keylog = Keylog::new();
        let line = PortraitRow::SpeedSnap.render(&view(&config, &keylog, 0));
        assert_eq!(line.as_str(), " 1.5  HOR");
    }

    #[test]
    fn portrait_flags() {
        let mut config = MtkConfig::default();
        config.set_auto_mouse_mode(true);
        config.set_scroll_mode(false);
        let keylog = Keylog::new();
        let line = PortraitRow::Modes.render(&view(&config, &keylog, 0));
        assert_eq!(line.as_str(), "[AML] scr ");
    }

    #[test]
    fn portrait_rows_fit_the_panel() {
        let mut config = MtkConfig::default();
        config.set_cpi(16000);
        config.set_auto_mouse_time_out(25500);
        let mut keylog = Keylog::new();
        keylog.record(0x0204, 12, 13);
        let v = StatusView {
            type_count: TypeCounter::with_count(99_999),
            uptime_minutes: 999,
            ..view(&config, &keylog, 7)
        };
        for row in PortraitRow::ALL {
            assert!(row.render(&v).len() <= OLED_WIDTH as usize, "{row:?}");
        }
        assert_eq!(PortraitRow::Cpi.render(&v).as_str(), "CP16000");
        assert_eq!(PortraitRow::TypeCount.render(&v).as_str(), "CN  99999");
    }

    #[test]
    fn indicator_shows_typing_progress_on_base_layer() {
        let config = MtkConfig::default();
        let keylog = Keylog::new();
        let v = StatusView {
            type_count: TypeCounter::with_count(9_000),
            ..view(&config, &keylog, 0)
        };
        assert_eq!(PortraitRow::Indicator.render(&v).as_str(), "***-------");
    }

    #[test]
    fn indicator_shows_layer_cells() {
        let config = MtkConfig::default();
        let keylog = Keylog::new();
        assert_eq!(
            PortraitRow::Indicator.render(&view(&config, &keylog, 3)).as_str(),
            ">>>-------"
        );
        assert_eq!(
            PortraitRow::Indicator.render(&view(&config, &keylog, 7)).as_str(),
            ">>>>>>>***"
        );
    }

    #[test]
    fn landscape_rail_tracks_layer() {
        let config = MtkConfig::default();
        let keylog = Keylog::new();
        let v = view(&config, &keylog, 2);
        let rail: heapless::Vec<char, 8> = LandscapeRow::ALL
            .iter()
            .map(|r| r.render(&v).chars().nth(5).unwrap_or(' '))
            .collect();
        assert_eq!(rail.as_slice(), &['=', '=', '=', '|', '|', '|', '|', '|']);
    }

    #[test]
    fn landscape_first_row() {
        let config = MtkConfig::default();
        let mut keylog = Keylog::new();
        keylog.record(0x0004, 0, 0);
        let line = LandscapeRow::Keylog.render(&view(&config, &keylog, 0));
        assert_eq!(line.as_str(), "Layer= 0004(a) =[AML]");
    }

    #[test]
    fn slave_is_blank_on_base_layer() {
        let config = MtkConfig::default();
        let keylog = Keylog::new();
        assert!(render(Layout::Slave, &view(&config, &keylog, 0)).is_empty());

        let lines = render(Layout::Slave, &view(&config, &keylog, 2));
        let rows: heapless::Vec<u8, 3> = lines.iter().map(|l| l.row).collect();
        assert_eq!(rows.as_slice(), &[0, 6, 7]);
        assert_eq!(lines[0].text.as_str(), "2    >>-------------");
        assert_eq!(lines[2].text.as_str(), " -------------<<");
    }

    #[test]
    fn full_layouts_have_every_row() {
        let config = MtkConfig::default();
        let keylog = Keylog::new();
        let v = view(&config, &keylog, 1);
        assert_eq!(render(Layout::Landscape, &v).len(), 8);
        assert_eq!(render(Layout::Portrait, &v).len(), 16);
    }
}
