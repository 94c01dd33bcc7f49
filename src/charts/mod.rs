//! Charts module - Figure building and rendering

mod dispatcher;
mod figure;
mod kind;
mod renderer;
mod theme;

pub use dispatcher::ChartDispatcher;
pub use kind::{ChartKind, StyleTheme};
pub use renderer::{RenderedFigure, StaticChartRenderer};
