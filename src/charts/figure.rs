//! Figure Model
//! What a chart shows, independent of how it is painted.
//!
//! `Marks` and the correlation matrix are the data-derived content. The
//! style theme and pixel size only matter to the renderer.

use crate::charts::{ChartKind, StyleTheme};
use crate::stats::HistogramBin;

/// Default point sizes for decorations.
pub const TICK_FONT_SIZE: f32 = 10.0;
pub const LABEL_FONT_SIZE: f32 = 10.0;
pub const TITLE_FONT_SIZE: f32 = 12.0;

/// One bar of a categorical chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub height: f64,
}

/// Data drawn inside one set of axes.
#[derive(Debug, Clone, PartialEq)]
pub enum Marks {
    /// Points joined in row order.
    Line(Vec<(f64, f64)>),
    Scatter(Vec<(f64, f64)>),
    /// Bars at categorical positions 0..n.
    Bars(Vec<Bar>),
    /// Histogram with an optional density curve already scaled to counts.
    Histogram {
        bins: Vec<HistogramBin>,
        density: Vec<(f64, f64)>,
    },
}

/// Text with a point size.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub size: f32,
}

impl Label {
    pub fn new(text: impl Into<String>, size: f32) -> Self {
        Self {
            text: text.into(),
            size,
        }
    }
}

/// Title, axis labels and tick styling of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    pub title: Option<Label>,
    pub x_label: Option<Label>,
    pub y_label: Option<Label>,
    pub tick_size: f32,
    /// Degrees, counter-clockwise.
    pub x_tick_rotation: f32,
    /// Text x axis: tick labels for positions 0..n.
    pub x_categories: Option<Vec<String>>,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            title: None,
            x_label: None,
            y_label: None,
            tick_size: TICK_FONT_SIZE,
            x_tick_rotation: 0.0,
            x_categories: None,
        }
    }
}

/// One set of axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub marks: Marks,
    pub decorations: Decorations,
}

/// Pearson correlations between the named columns; `values[i][j]` pairs
/// `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Cell annotation, two decimals; blank for undefined correlations.
    pub fn annotation(&self, row: usize, col: usize) -> String {
        match self.values.get(row).and_then(|r| r.get(col)) {
            Some(v) if v.is_finite() => format!("{:.2}", v),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FigureLayout {
    Single(Panel),
    /// Square grid over `variables`, panels in row-major order.
    Grid {
        variables: Vec<String>,
        panels: Vec<Panel>,
    },
    Heatmap(CorrelationMatrix),
}

/// A figure ready for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: ChartKind,
    pub theme: StyleTheme,
    /// Pixel size (width, height).
    pub size: (u32, u32),
    pub layout: FigureLayout,
}

impl Figure {
    /// The single panel, if this figure has one.
    #[cfg(test)]
    pub fn panel(&self) -> Option<&Panel> {
        match &self.layout {
            FigureLayout::Single(panel) => Some(panel),
            _ => None,
        }
    }
}
