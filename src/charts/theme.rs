//! Theme Palettes
//! Colors and axis styling for each style theme, modelled on the seaborn presets.

use crate::charts::StyleTheme;
use plotters::style::RGBColor;

const WHITE: RGBColor = RGBColor(255, 255, 255);
const DARK_TEXT: RGBColor = RGBColor(38, 38, 38);
const SEABORN_GRAY: RGBColor = RGBColor(234, 234, 242);
const LIGHT_GRID: RGBColor = RGBColor(204, 204, 204);

/// First color of the "deep" palette; used for every series.
pub const SERIES_COLOR: RGBColor = RGBColor(76, 114, 176);

/// Resolved drawing style for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeStyle {
    pub figure_background: RGBColor,
    pub plot_background: RGBColor,
    pub grid: Option<RGBColor>,
    /// Spines; `None` leaves the plot area borderless.
    pub axis_line: Option<RGBColor>,
    pub tick_marks: bool,
    pub text: RGBColor,
    pub series: RGBColor,
}

impl ThemeStyle {
    pub fn for_theme(theme: StyleTheme) -> Self {
        let base = Self {
            figure_background: WHITE,
            plot_background: WHITE,
            grid: None,
            axis_line: Some(DARK_TEXT),
            tick_marks: false,
            text: DARK_TEXT,
            series: SERIES_COLOR,
        };

        match theme {
            StyleTheme::Dark => Self {
                plot_background: SEABORN_GRAY,
                axis_line: None,
                ..base
            },
            StyleTheme::DarkGrid => Self {
                plot_background: SEABORN_GRAY,
                grid: Some(WHITE),
                axis_line: None,
                ..base
            },
            StyleTheme::White => base,
            StyleTheme::WhiteGrid => Self {
                grid: Some(LIGHT_GRID),
                ..base
            },
            StyleTheme::Ticks => Self {
                tick_marks: true,
                ..base
            },
        }
    }

    /// Color used where an element should not be visible against the plot area.
    pub fn axis_or_background(&self) -> RGBColor {
        self.axis_line.unwrap_or(self.plot_background)
    }
}

/// Matplotlib's "coolwarm" diverging map sampled at `t` in [0, 1].
pub fn coolwarm(t: f64) -> RGBColor {
    const STOPS: [(f64, (f64, f64, f64)); 5] = [
        (0.00, (59.0, 76.0, 192.0)),
        (0.25, (124.0, 159.0, 249.0)),
        (0.50, (221.0, 221.0, 221.0)),
        (0.75, (246.0, 152.0, 121.0)),
        (1.00, (180.0, 4.0, 38.0)),
    ];

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let upper = STOPS
        .iter()
        .position(|(stop, _)| *stop >= t)
        .unwrap_or(STOPS.len() - 1)
        .max(1);
    let (t0, c0) = STOPS[upper - 1];
    let (t1, c1) = STOPS[upper];
    let f = (t - t0) / (t1 - t0);
    let lerp = |a: f64, b: f64| (a + (b - a) * f).round() as u8;

    RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
}

/// Black or white, whichever reads better on `background`.
pub fn annotation_color(background: RGBColor) -> RGBColor {
    let channel = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    let luminance =
        0.2126 * channel(background.0) + 0.7152 * channel(background.1) + 0.0722 * channel(background.2);

    if luminance > 0.408 {
        DARK_TEXT
    } else {
        WHITE
    }
}
