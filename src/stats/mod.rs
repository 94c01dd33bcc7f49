//! Stats module - numeric helpers behind the charts

mod calculator;

pub use calculator::{HistogramBin, StatsCalculator, KDE_GRID_POINTS};
