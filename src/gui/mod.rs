//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod data_preview;

pub use app::DataVisualizerApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction, Status};
pub use data_preview::DataPreview;
